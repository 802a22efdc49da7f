//! The ChatRoom grain: one activation per channel name, owning the channel's membership
//! and its append-only history.

pub mod calls;
pub mod context;
pub mod entity;
pub mod error;

pub use calls::{ChatRoomCall, ChatRoomReply};
pub use context::ChatRoomContext;
pub use entity::ChatRoom;
pub use error::ChatRoomError;

/// Stream namespace that chat rooms publish [`ChatEvent`](crate::model::ChatEvent)s on,
/// keyed by channel name.
pub const CHAT_NAMESPACE: &str = "chat";
