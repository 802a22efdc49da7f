//! Typed wrappers over [`GrainRef`](grain_framework::GrainRef)s.

pub mod chat_room_client;
pub mod ticker_client;

pub use chat_room_client::ChatRoomClient;
pub use ticker_client::TickerClient;
