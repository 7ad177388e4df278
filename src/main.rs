use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use uet_chat::app::App;
use uet_chat::tui::{self, EventHandler};
use uet_chat::{handler, ui, ChatClient, Config, Overrides, Settings, Variant};

#[derive(Parser, Debug)]
#[command(name = "uet-chat")]
#[command(author, version, about = "Terminal chat for the UET AI question-answering service")]
struct Cli {
    /// Base URL of the question-answering backend
    #[arg(long, env = "CHAT_BACKEND_URL")]
    backend_url: Option<String>,

    /// Which backend to talk to
    #[arg(long, env = "CHAT_VARIANT", value_enum)]
    variant: Option<Variant>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where log output goes; the terminal belongs to the UI
    #[arg(long, default_value = "uet-chat.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_name = cli
        .log_file
        .file_name()
        .context("Log file path has no file name")?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(log_name.to_string_lossy())
        .build(&log_dir)
        .with_context(|| format!("Failed to open log file {}", cli.log_file.display()))?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uet_chat=info")),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let overrides = Overrides {
        backend_url: cli.backend_url,
        variant: cli.variant,
        gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
    };
    let settings = Settings::resolve(config, overrides).context("Failed to resolve settings")?;
    info!(
        variant = settings.variant.as_str(),
        backend_url = %settings.backend_url,
        "starting"
    );

    let client = ChatClient::from_settings(&settings)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, client).await;

    tui::restore()?;

    if let Err(e) = &result {
        error!(error = ?e, "exited with error");
    }
    info!("shutdown complete");
    result
}

async fn run(terminal: &mut tui::Tui, client: ChatClient) -> Result<()> {
    let mut events = EventHandler::new();
    let mut app = App::new(client, events.sender());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event)?,
            None => break,
        }
    }

    Ok(())
}
