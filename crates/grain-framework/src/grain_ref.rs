//! # Grain Reference
//!
//! A [`GrainRef`] is the address of one grain identity. Creating it is pure addressing:
//! nothing is sent and nothing is activated until the first [`GrainRef::invoke`].

use crate::error::InvocationError;
use crate::grain::Grain;
use crate::message::{DirectoryRequest, Envelope};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// ## GrainRef
///
/// A type-safe handle to `(G::GRAIN_TYPE, id)`. Calls are routed through the directory of
/// `G`, which activates the identity on first use and queues the call on its mailbox. The
/// reply comes back over a oneshot channel.
///
/// * **Cloneable** – holds only the id, a sender and the connection flag.
/// * **Location transparent** – the caller never learns which task hosts the grain.
pub struct GrainRef<G: Grain> {
    id: G::Id,
    router: mpsc::Sender<DirectoryRequest<G>>,
    connected: Arc<AtomicBool>,
}

impl<G: Grain> Clone for GrainRef<G> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            router: self.router.clone(),
            connected: self.connected.clone(),
        }
    }
}

impl<G: Grain> GrainRef<G> {
    pub fn new(
        id: G::Id,
        router: mpsc::Sender<DirectoryRequest<G>>,
        connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            router,
            connected,
        }
    }

    pub fn id(&self) -> &G::Id {
        &self.id
    }

    /// Sends one call and waits for the grain's reply.
    pub async fn invoke(&self, call: G::Call) -> Result<G::Reply, InvocationError> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(InvocationError::ConnectionClosed);
        }
        let (respond_to, response) = oneshot::channel();
        self.router
            .send(DirectoryRequest::Invoke {
                id: self.id.clone(),
                envelope: Envelope { call, respond_to },
            })
            .await
            .map_err(|_| InvocationError::SiloUnavailable)?;
        response
            .await
            .map_err(|_| InvocationError::ActivationDropped)?
    }
}
