use reqwest::StatusCode;
use thiserror::Error;

/// Why a chat request produced no usable reply
#[derive(Debug, Error)]
pub enum ChatError {
    /// Connection refused, DNS failure, timeout and the like
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body was not JSON
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
