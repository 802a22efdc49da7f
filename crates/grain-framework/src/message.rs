//! # Generic Messages
//!
//! Message types exchanged between [`GrainRef`](crate::GrainRef), the per-type directory
//! and the activations.

use crate::error::InvocationError;
use crate::grain::Grain;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by activations.
pub type Response<T> = oneshot::Sender<Result<T, InvocationError>>;

/// A call waiting in an activation's mailbox.
#[derive(Debug)]
pub struct Envelope<G: Grain> {
    pub call: G::Call,
    pub respond_to: Response<G::Reply>,
}

/// Requests accepted by the directory of one grain type.
///
/// `Invoke` is the only request a [`GrainRef`](crate::GrainRef) sends. The directory
/// activates `id` if needed and forwards the envelope to its mailbox.
#[derive(Debug)]
pub enum DirectoryRequest<G: Grain> {
    Invoke { id: G::Id, envelope: Envelope<G> },
    /// Sent by an activation that evicted itself after the idle timeout.
    Evicted { id: G::Id },
    /// Stops routing, drains every activation and replies once all have exited.
    Shutdown { respond_to: oneshot::Sender<()> },
}
