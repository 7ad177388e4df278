//! Conversation message types
//!
//! A message is either a user turn or an assistant turn. The role is the enum
//! variant itself, so it cannot change after creation and there is no way to
//! build a message without both an id and a body.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Last timestamp handed out, so ids minted in the same millisecond stay unique.
static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

fn next_stamp() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_STAMP.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

/// Opaque, time-based message id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Id for a user message: the creation time in milliseconds
    pub fn user() -> Self {
        Self(next_stamp().to_string())
    }

    /// Id for an assistant message, suffixed so it never collides with a user id
    pub fn assistant() -> Self {
        Self(format!("{}-bot", next_stamp()))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    User { id: MessageId, content: String },
    Assistant { id: MessageId, content: String },
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            id: MessageId::user(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            id: MessageId::assistant(),
            content: content.into(),
        }
    }

    pub fn id(&self) -> &MessageId {
        match self {
            ChatMessage::User { id, .. } | ChatMessage::Assistant { id, .. } => id,
        }
    }

    pub fn role(&self) -> ChatRole {
        match self {
            ChatMessage::User { .. } => ChatRole::User,
            ChatMessage::Assistant { .. } => ChatRole::Assistant,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ChatMessage::User { content, .. } | ChatMessage::Assistant { content, .. } => content,
        }
    }
}
