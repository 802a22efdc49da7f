//! # Grain Chat
//!
//! A small chat and task service on top of [`grain_framework`].
//!
//! - **[chat_room]**: one grain per channel, owning membership and an append-only history.
//! - **[ticker]**: a singleton grain running bounded batches of synthetic work.
//! - **[clients]**: typed wrappers such as [`ChatRoomClient`](clients::ChatRoomClient).
//! - **[bootstrap]**: connecting to the cluster with bounded, injectable retry.
//! - **[session]**: the console command loop.
//! - **[lifecycle]**: starting and stopping the silo, logging setup.
//! - **[config]**: defaults, TOML file and environment overrides.
//!
//! See [`grain_framework::mock`] for testing clients without a silo.

pub mod bootstrap;
pub mod chat_room;
pub mod clients;
pub mod clock;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod session;
pub mod ticker;
