//! # Grain Trait
//!
//! The `Grain` trait is the contract every addressable actor type implements to be hosted
//! by the silo. A grain is never created explicitly: the first call addressed to
//! `(GRAIN_TYPE, id)` activates it through [`Grain::activate`], and from then on every call
//! to that identity is delivered to the same in-memory instance.
//!
//! # Architecture Note
//! The silo owns the plumbing (directory, mailboxes, tasks) and the grain owns only its
//! state and its [`Grain::handle`] logic. Because each activation drains its mailbox one call
//! at a time, `handle` takes `&mut self` and needs no locking.
//!
//! # Provided Methods (Hooks)
//! - [`Grain::on_activate`]
//! - [`Grain::on_deactivate`]
//!
//! Both default to `Ok(())`.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any addressable actor type must implement to be hosted by a silo.
///
/// # Async & Context
/// The trait is `#[async_trait]` so hooks can await (e.g., publish to a stream).
/// `Context` is registered once with the silo and shared by every activation of the
/// type, which keeps dependencies out of the per-instance state.
#[async_trait]
pub trait Grain: Send + 'static {
    /// Type name used for routing, logging and [`crate::InvocationError::UnknownGrainType`].
    const GRAIN_TYPE: &'static str;

    /// The stable identity the grain is addressed by (channel name, singleton key, ...).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;

    /// The request enum accepted by [`Grain::handle`].
    type Call: Send + Debug + 'static;

    /// The reply enum returned by [`Grain::handle`].
    type Reply: Send + Debug + 'static;

    /// Dependencies shared by all activations of this type.
    /// Use `()` if none are needed.
    type Context: Clone + Send + Sync + 'static;

    /// The error type returned by this grain's calls.
    ///
    /// A call that returns an error must leave the grain state untouched: validate first,
    /// mutate last.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds the initial state for a freshly activated identity.
    fn activate(id: &Self::Id) -> Self;

    /// Called once after [`Grain::activate`], before the first call is handled.
    /// Returning an error fails the pending call and discards the activation.
    async fn on_activate(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when the activation is evicted or the silo stops.
    async fn on_deactivate(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handles one call. Runs to completion before the next call on this identity starts.
    async fn handle(
        &mut self,
        call: Self::Call,
        ctx: &Self::Context,
    ) -> Result<Self::Reply, Self::Error>;
}
