pub mod backend;
pub mod gemini;

pub use backend::BackendClient;
pub use gemini::GeminiClient;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Settings;
use crate::conversation::Submission;
use crate::error::ChatError;
use crate::variant::Variant;

#[derive(Clone)]
enum Transport {
    Backend(BackendClient),
    Gemini(GeminiClient),
}

/// The request side of the chat view: one call per submission, and every
/// outcome turned into displayable text.
#[derive(Clone)]
pub struct ChatClient {
    variant: Variant,
    transport: Transport,
}

impl ChatClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        let transport = match settings.variant {
            Variant::Backend => Transport::Backend(BackendClient::new(
                http,
                &settings.backend_url,
                Some(settings.context.clone()),
            )),
            Variant::Basic => Transport::Backend(BackendClient::new(http, &settings.backend_url, None)),
            Variant::Gemini => Transport::Gemini(GeminiClient::new(
                http,
                &settings.gemini_url,
                settings.gemini_api_key.clone(),
            )),
        };

        Ok(Self {
            variant: settings.variant,
            transport,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Raw outcome: `Ok(None)` means a successful response without an answer.
    pub async fn ask(&self, submission: &Submission) -> Result<Option<String>, ChatError> {
        match &self.transport {
            Transport::Backend(client) => client.ask(submission).await,
            Transport::Gemini(client) => client.ask(submission).await,
        }
    }

    /// The assistant text for a submission. Never fails.
    pub async fn reply(&self, submission: &Submission) -> String {
        match self.ask(submission).await {
            Ok(Some(answer)) => {
                info!(chars = answer.chars().count(), "reply received");
                answer
            }
            Ok(None) => {
                info!("response had no answer, using fallback");
                self.variant.fallback_text().to_string()
            }
            Err(e) => {
                warn!(error = %e, "request failed");
                self.variant.failure_text().to_string()
            }
        }
    }
}
