use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::Terminal;
use tokio::sync::mpsc;

use uet_chat::app::App;
use uet_chat::{ui, ChatClient, Settings, Variant};

fn app(variant: Variant) -> App {
    let (tx, _rx) = mpsc::unbounded_channel();
    let settings = Settings {
        variant,
        ..Settings::default()
    };
    App::new(ChatClient::from_settings(&settings).unwrap(), tx)
}

fn screen(buffer: &Buffer) -> String {
    let width = usize::from(buffer.area.width).max(1);
    let mut out = String::new();
    for row in buffer.content.chunks(width) {
        for cell in row {
            out.push_str(cell.symbol());
        }
        out.push('\n');
    }
    out
}

fn draw(app: &mut App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| ui::render(app, frame)).unwrap();
    screen(terminal.backend().buffer())
}

#[test]
fn test_empty_backend_chat_shows_welcome_and_model() {
    let mut app = app(Variant::Backend);
    let text = draw(&mut app, 80, 20);

    assert!(text.contains("UET AI"));
    assert!(text.contains("Chào bạn!"));
    assert!(text.contains("Tôi có thể giúp gì cho bạn"));
    assert!(text.contains("[Qwen3 4B pretrain]"));
}

#[test]
fn test_pending_request_shows_indicator() {
    let mut app = app(Variant::Backend);
    app.conversation.set_input("Xin chào");
    app.conversation.submit().unwrap();

    let text = draw(&mut app, 80, 20);
    assert!(text.contains("Xin chào"));
    assert!(text.contains("●"));
    assert!(!text.contains("Tôi có thể giúp gì cho bạn"));
}

#[test]
fn test_gemini_has_greeting_and_no_model_bar() {
    let mut app = app(Variant::Gemini);
    let text = draw(&mut app, 80, 20);

    assert!(text.contains("Gemini"));
    assert!(text.contains("Xin chào! Tôi là Gemini."));
    assert!(!text.contains("Chọn mô hình"));
}

#[test]
fn test_long_transcript_snaps_to_bottom_on_first_draw() {
    let mut app = app(Variant::Basic);
    for i in 0..30 {
        app.conversation.set_input(&format!("câu hỏi {}", i));
        app.conversation.submit().unwrap();
        app.conversation.resolve(format!("trả lời {}", i));
    }

    let text = draw(&mut app, 60, 20);
    assert!(text.contains("trả lời 29"));
    assert!(!text.contains("trả lời 0"));
    assert!(app.autoscroll.offset() > 0);
}

#[test]
fn test_wide_characters_wrap_instead_of_clipping() {
    let mut app = app(Variant::Basic);
    app.conversation.set_input("Chữ Hán?");
    app.conversation.submit().unwrap();
    app.conversation.resolve(format!("{} END", "学".repeat(30)));

    let text = draw(&mut app, 40, 20);
    assert_eq!(text.matches('学').count(), 30);
    assert!(text.contains("END"));
}

#[test]
fn test_indented_answer_keeps_its_layout() {
    let mut app = app(Variant::Basic);
    app.conversation.set_input("Các bước?");
    app.conversation.submit().unwrap();
    app.conversation.resolve("Các bước:\n    1. Đăng ký");

    let text = draw(&mut app, 60, 20);
    assert!(text.contains("│    1. Đăng ký"));
}

#[test]
fn test_tiny_terminal_does_not_panic() {
    let mut app = app(Variant::Gemini);
    app.conversation.set_input("một\nhai\nba");
    draw(&mut app, 4, 3);
}
