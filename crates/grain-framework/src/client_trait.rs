//! # GrainClient Trait
//!
//! Provides a common interface for grain-specific clients: one `call` method built on top of
//! a [`GrainRef`], with framework errors mapped into the client's own error type.
use crate::{Grain, GrainRef, InvocationError};
use async_trait::async_trait;

/// Trait for grain-specific clients.
///
/// Implementors only supply the inner reference and the error mapping; typed methods such
/// as `join` or `tick` are then thin wrappers over [`GrainClient::call`].
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// pub struct TickerClient {
///     inner: GrainRef<Ticker>,
/// }
///
/// #[async_trait]
/// impl GrainClient<Ticker> for TickerClient {
///     type Error = TickerError;
///
///     fn grain(&self) -> &GrainRef<Ticker> {
///         &self.inner
///     }
///
///     fn map_error(e: InvocationError) -> Self::Error {
///         TickerError::from_invocation(e)
///     }
/// }
/// ```
#[async_trait]
pub trait GrainClient<G: Grain>: Send + Sync {
    /// The grain-specific error type.
    type Error: Send + Sync;

    /// Access the inner grain reference.
    fn grain(&self) -> &GrainRef<G>;

    /// Map framework errors to the grain-specific error type.
    fn map_error(e: InvocationError) -> Self::Error;

    /// Send one call and wait for the reply.
    #[tracing::instrument(skip(self), fields(grain_type = G::GRAIN_TYPE))]
    async fn call(&self, call: G::Call) -> Result<G::Reply, Self::Error> {
        tracing::debug!("Sending request");
        self.grain().invoke(call).await.map_err(Self::map_error)
    }
}
