pub mod app;
pub mod autoscroll;
pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod handler;
pub mod message;
pub mod tui;
pub mod ui;
pub mod variant;

// Re-export main types for convenience
pub use client::ChatClient;
pub use config::{Config, Overrides, Settings};
pub use conversation::{Conversation, RequestState, Submission};
pub use error::ChatError;
pub use message::{ChatMessage, ChatRole, MessageId};
pub use variant::Variant;
