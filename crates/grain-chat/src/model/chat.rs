use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a channel's history.
///
/// The `created_at` a caller supplies is only a placeholder: the chat room restamps every
/// message it accepts, so history timestamps never go backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Notification published on the `chat` stream of a channel after each successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatEvent {
    Joined(String),
    Left(String),
    Posted(ChatMessage),
}
