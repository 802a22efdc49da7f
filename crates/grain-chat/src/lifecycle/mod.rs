//! Process lifecycle: bringing the silo up and down, and logging setup.

pub mod chat_system;
pub mod tracing;

pub use chat_system::ChatSystem;
