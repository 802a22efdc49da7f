//! Pure data structures shared by grains, clients and the session.

pub mod chat;

pub use chat::{ChatEvent, ChatMessage};
