use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::conversation::Submission;
use crate::error::ChatError;
use crate::message::{ChatMessage, ChatRole};

pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";

#[derive(Serialize, Debug, PartialEq, Eq)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    /// The whole history, in order, with assistant turns as `model`
    pub fn from_history(history: &[ChatMessage]) -> Self {
        let contents = history
            .iter()
            .map(|msg| GeminiContent {
                role: match msg.role() {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                },
                parts: vec![GeminiPart {
                    text: msg.content().to_string(),
                }],
            })
            .collect();

        Self { contents }
    }
}

/// Client for Gemini's `generateContent`.
///
/// The key is optional: when the URL points at a proxy that adds it
/// server-side, nothing secret lives in this process.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(client: Client, url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.to_string(),
            api_key,
        }
    }

    pub async fn ask(&self, submission: &Submission) -> Result<Option<String>, ChatError> {
        let request = GeminiRequest::from_history(&submission.history);

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key)]);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error");
            return Err(ChatError::Status { status, body });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        debug!(?body, "Gemini response");

        Ok(extract_text(&body))
    }
}

/// `candidates[0].content.parts[0].text`, if every step exists and it is non-empty
pub fn extract_text(body: &Value) -> Option<String> {
    body.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_maps_roles() {
        let history = vec![
            ChatMessage::assistant("Xin chào! Tôi là Gemini. Bạn cần hỏi gì?"),
            ChatMessage::user("Hà Nội ở đâu?"),
        ];
        let body = serde_json::to_value(GeminiRequest::from_history(&history)).unwrap();
        assert_eq!(
            body,
            json!({"contents": [
                {"role": "model", "parts": [{"text": "Xin chào! Tôi là Gemini. Bạn cần hỏi gì?"}]},
                {"role": "user", "parts": [{"text": "Hà Nội ở đâu?"}]},
            ]})
        );
    }

    #[test]
    fn test_extract_text_paths() {
        let full = json!({"candidates": [{"content": {"parts": [{"text": "Ở miền Bắc"}]}}]});
        assert_eq!(extract_text(&full).as_deref(), Some("Ở miền Bắc"));

        assert_eq!(extract_text(&json!({})), None);
        assert_eq!(extract_text(&json!({"candidates": []})), None);
        assert_eq!(extract_text(&json!({"candidates": [{"content": {}}]})), None);
        assert_eq!(extract_text(&json!({"candidates": [{"content": {"parts": []}}]})), None);
        assert_eq!(extract_text(&json!({"candidates": [{"content": {"parts": [{}]}}]})), None);
    }
}
