//! # Grain Framework
//!
//! An in-process runtime for **virtual actors** ("grains"). A grain is addressed by a stable
//! identity, a channel name or a singleton key, and the caller never creates it, places it
//! or tears it down. The first call addressed to `(type, id)` activates the grain; every later
//! call to that identity reaches the same instance, one call at a time.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Grain Layer** ([`Grain`]) - Your state and call handling
//! 2. **Runtime Layer** ([`Silo`]) - Directories, activations, streams, lifecycle
//! 3. **Interface Layer** ([`ClusterClient`], [`GrainRef`], [`GrainClient`]) - Connecting and calling
//!
//! ```text
//!  ClusterClient ──get_grain(id)──► GrainRef<G> ──Invoke──► Directory<G> ──► Activation(id)
//!        ▲                                                      │ (one task per id,
//!        │ connect                                              │  sequential mailbox)
//!  LocalGateway ◄──── Silo (one Directory task per grain type) ─┘
//! ```
//!
//! ## Concurrency Model
//!
//! - Each activation runs in its own Tokio task and drains its mailbox sequentially, so a
//!   grain's `handle` never runs concurrently with itself and needs no locks.
//! - Activations of different identities are independent tasks and run in parallel.
//! - Routing never waits on a grain: mailboxes are unbounded, the directory channel is
//!   bounded by [`SiloConfig::directory_buffer`].
//!
//! ## Lifecycle
//!
//! - **Create on first use**: [`Grain::activate`] then [`Grain::on_activate`].
//! - **Optional eviction**: types registered with [`SiloBuilder::register_evictable`]
//!   deactivate after [`SiloConfig::idle_timeout`] and the next call activates a fresh
//!   instance. Calls that arrive meanwhile wait until the old instance has deactivated.
//! - **Graceful stop**: [`Silo::stop`] refuses new connections, stops routing, lets every
//!   activation finish its queue and runs [`Grain::on_deactivate`].
//!
//! ## Streams
//!
//! [`StreamProvider`] offers typed broadcast streams keyed by namespace and key, for
//! grains that fan out notifications to subscribers.
//!
//! ## Testing
//!
//! See the [`mock`] module for [`mock::MockGrain`] and the raw receiver helpers.

mod activation;
pub mod client_trait;
pub mod cluster;
mod directory;
pub mod error;
pub mod grain;
pub mod grain_ref;
pub mod message;
pub mod mock;
pub mod silo;
pub mod stream;

// Re-export core types for convenience
pub use client_trait::GrainClient;
pub use cluster::{ClusterClient, ClusterConnector, ClusterEndpoint, LocalGateway};
pub use error::{ConnectionError, InvocationError};
pub use grain::Grain;
pub use grain_ref::GrainRef;
pub use message::{DirectoryRequest, Envelope, Response};
pub use silo::{Silo, SiloBuilder, SiloConfig};
pub use stream::StreamProvider;
