//! # Grain Activation
//!
//! An activation is the in-memory instance of one grain identity. It owns the grain state
//! and the receiving end of its mailbox, and runs in its own Tokio task.

use crate::error::InvocationError;
use crate::grain::Grain;
use crate::message::{DirectoryRequest, Envelope};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The running instance of one `(G::GRAIN_TYPE, id)` pair.
///
/// **Concurrency Model**:
/// Calls are taken from the mailbox one at a time and each `handle` future is awaited to
/// completion before the next call is received. That loop is the single-threaded guarantee
/// the grains rely on: two calls to the same identity never interleave, while activations of
/// different identities run on separate tasks.
///
/// # Lifecycle
///
/// 1. `on_activate` runs before the first call. If it fails, every queued call is answered
///    with [`InvocationError::ActivationFailed`] and the activation exits.
/// 2. Calls are handled in mailbox order.
/// 3. The loop ends when the directory drops the mailbox sender (silo stop), or when the
///    optional idle timeout elapses. On idle eviction the mailbox is closed first and the
///    calls already queued are still handled.
/// 4. `on_deactivate` runs once on the way out.
/// 5. An evicted activation reports back to the directory only after `on_deactivate`, so
///    the next instance of the same id never overlaps this one.
pub(crate) struct Activation<G: Grain> {
    id: G::Id,
    grain: G,
    mailbox: mpsc::UnboundedReceiver<Envelope<G>>,
    directory: mpsc::WeakSender<DirectoryRequest<G>>,
    idle_timeout: Option<Duration>,
    handled: u64,
}

impl<G: Grain> Activation<G> {
    pub(crate) fn new(
        id: G::Id,
        mailbox: mpsc::UnboundedReceiver<Envelope<G>>,
        directory: mpsc::WeakSender<DirectoryRequest<G>>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        let grain = G::activate(&id);
        Self {
            id,
            grain,
            mailbox,
            directory,
            idle_timeout,
            handled: 0,
        }
    }

    /// Runs the activation until its mailbox closes or it is evicted.
    pub(crate) async fn run(mut self, context: G::Context) {
        let grain_type = G::GRAIN_TYPE;

        if let Err(e) = self.grain.on_activate(&context).await {
            warn!(grain_type, id = %self.id, error = %e, "on_activate failed");
            self.reject_queued(e.to_string());
            self.notify_evicted().await;
            return;
        }
        info!(grain_type, id = %self.id, "Activated");

        let mut evicted = false;
        loop {
            let next = match self.idle_timeout {
                Some(idle) => match tokio::time::timeout(idle, self.mailbox.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        evicted = true;
                        break;
                    }
                },
                None => self.mailbox.recv().await,
            };
            match next {
                Some(envelope) => self.dispatch(envelope, &context).await,
                None => break,
            }
        }

        if evicted {
            debug!(grain_type, id = %self.id, "Idle timeout, evicting");
            // New sends fail from here on and are re-routed by the directory.
            self.mailbox.close();
            while let Some(envelope) = self.mailbox.recv().await {
                self.dispatch(envelope, &context).await;
            }
        }

        if let Err(e) = self.grain.on_deactivate(&context).await {
            warn!(grain_type, id = %self.id, error = %e, "on_deactivate failed");
        }
        info!(grain_type, id = %self.id, handled = self.handled, evicted, "Deactivated");

        // The directory holds new calls for this id until it hears back.
        if evicted {
            self.notify_evicted().await;
        }
    }

    async fn dispatch(&mut self, envelope: Envelope<G>, context: &G::Context) {
        let grain_type = G::GRAIN_TYPE;
        let Envelope { call, respond_to } = envelope;
        debug!(grain_type, id = %self.id, ?call, "Call");

        let result = self
            .grain
            .handle(call, context)
            .await
            .map_err(|e| InvocationError::GrainError(Box::new(e)));
        self.handled += 1;
        match &result {
            Ok(_) => debug!(grain_type, id = %self.id, "Call ok"),
            Err(e) => warn!(grain_type, id = %self.id, error = %e, "Call failed"),
        }
        let _ = respond_to.send(result);
    }

    fn reject_queued(&mut self, reason: String) {
        self.mailbox.close();
        while let Ok(envelope) = self.mailbox.try_recv() {
            let _ = envelope.respond_to.send(Err(InvocationError::ActivationFailed {
                grain_type: G::GRAIN_TYPE,
                id: self.id.to_string(),
                reason: reason.clone(),
            }));
        }
    }

    async fn notify_evicted(&mut self) {
        if let Some(directory) = self.directory.upgrade() {
            // Fails only once the directory has stopped routing.
            let _ = directory
                .send(DirectoryRequest::Evicted {
                    id: self.id.clone(),
                })
                .await;
        }
    }
}
