use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::conversation::Submission;
use crate::error::ChatError;

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Client for the question-answering service's `POST /ask`
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    /// Sent only by the model-selecting variant
    context: Option<String>,
}

impl BackendClient {
    pub fn new(client: Client, base_url: &str, context: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            context,
        }
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }

    pub fn build_request(&self, submission: &Submission) -> AskRequest {
        AskRequest {
            question: submission.question.clone(),
            model: submission.model.clone(),
            context: submission.model.as_ref().and(self.context.clone()),
        }
    }

    /// Returns `Ok(None)` when the response is fine but carries no answer.
    pub async fn ask(&self, submission: &Submission) -> Result<Option<String>, ChatError> {
        let url = self.ask_url();
        let request = self.build_request(submission);

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "backend request failed");
            return Err(ChatError::Status { status, body });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        debug!(?body, "backend response");

        Ok(extract_answer(&body))
    }
}

/// `answer` as a non-empty string, if present
pub fn extract_answer(body: &Value) -> Option<String> {
    body.get("answer")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChatMessage;
    use serde_json::json;

    fn submission(model: Option<&str>) -> Submission {
        Submission {
            question: "Quy chế là gì?".to_string(),
            model: model.map(str::to_string),
            history: vec![ChatMessage::user("Quy chế là gì?")],
        }
    }

    #[test]
    fn test_rich_request_carries_model_and_context() {
        let client = BackendClient::new(Client::new(), "http://localhost:8000/", Some(String::new()));
        let body = serde_json::to_value(client.build_request(&submission(Some("Qwen3 1.7B")))).unwrap();
        assert_eq!(
            body,
            json!({"question": "Quy chế là gì?", "model": "Qwen3 1.7B", "context": ""})
        );
        assert_eq!(client.ask_url(), "http://localhost:8000/ask");
    }

    #[test]
    fn test_basic_request_is_question_only() {
        let client = BackendClient::new(Client::new(), "http://localhost:8000", None);
        let body = serde_json::to_value(client.build_request(&submission(None))).unwrap();
        assert_eq!(body, json!({"question": "Quy chế là gì?"}));
    }

    #[test]
    fn test_extract_answer() {
        assert_eq!(extract_answer(&json!({"answer": "Bài 1"})).as_deref(), Some("Bài 1"));
        assert_eq!(extract_answer(&json!({})), None);
        assert_eq!(extract_answer(&json!({"answer": ""})), None);
        assert_eq!(extract_answer(&json!({"answer": null})), None);
        assert_eq!(extract_answer(&json!([1, 2])), None);
    }
}
