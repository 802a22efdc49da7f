use crate::model::ChatMessage;

/// Calls understood by a chat room.
#[derive(Debug, Clone)]
pub enum ChatRoomCall {
    /// Add a participant. Idempotent.
    Join(String),
    /// Remove a participant if present.
    Leave(String),
    /// Append a message. The room assigns `created_at`.
    Message(ChatMessage),
    /// The most recent `n` messages, oldest first.
    ReadHistory(i64),
    /// Current members, sorted.
    Members,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatRoomReply {
    Done,
    History(Vec<ChatMessage>),
    Members(Vec<String>),
}
