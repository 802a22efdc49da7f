//! The Ticker grain: a singleton that performs a bounded batch of synthetic work units per
//! call and reports how many of them succeeded.

pub mod calls;
pub mod entity;
pub mod error;
pub mod work;

pub use calls::{TickResult, TickerCall, TickerReply};
pub use entity::{Ticker, TickerContext, MAX_UNITS_PER_TICK, TICKER_ID};
pub use error::TickerError;
pub use work::{SpinWork, WorkUnit};
