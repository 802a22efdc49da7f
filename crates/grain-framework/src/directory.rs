//! # Grain Directory
//!
//! One directory task exists per registered grain type. It owns the `id -> mailbox` table,
//! activates identities on first use and forwards every call to the right mailbox.

use crate::activation::Activation;
use crate::error::InvocationError;
use crate::grain::Grain;
use crate::message::{DirectoryRequest, Envelope};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::SendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

struct Slot<G: Grain> {
    mailbox: mpsc::UnboundedSender<Envelope<G>>,
    handle: JoinHandle<()>,
    /// Calls that arrived after the activation closed its mailbox, in arrival order. They
    /// go to the next activation once this one has deactivated.
    held: Vec<Envelope<G>>,
}

/// Routing table and activation factory for grain type `G`.
///
/// The directory never awaits a grain: mailboxes are unbounded, so forwarding is a plain
/// enqueue and a slow grain cannot stall calls addressed to other identities.
pub(crate) struct Directory<G: Grain> {
    receiver: mpsc::Receiver<DirectoryRequest<G>>,
    weak_sender: mpsc::WeakSender<DirectoryRequest<G>>,
    activations: HashMap<G::Id, Slot<G>>,
    idle_timeout: Option<Duration>,
}

impl<G: Grain> Directory<G> {
    /// Creates the directory and the sender that [`GrainRef`](crate::GrainRef)s route through.
    pub(crate) fn new(
        buffer_size: usize,
        idle_timeout: Option<Duration>,
    ) -> (Self, mpsc::Sender<DirectoryRequest<G>>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let directory = Self {
            receiver,
            weak_sender: sender.downgrade(),
            activations: HashMap::new(),
            idle_timeout,
        };
        (directory, sender)
    }

    pub(crate) async fn run(mut self, context: G::Context) {
        let grain_type = G::GRAIN_TYPE;
        info!(grain_type, "Directory started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                DirectoryRequest::Invoke { id, envelope } => {
                    self.route(id, envelope, &context);
                }
                DirectoryRequest::Evicted { id } => self.evicted(id, &context),
                DirectoryRequest::Shutdown { respond_to } => {
                    self.drain().await;
                    let _ = respond_to.send(());
                    break;
                }
            }
        }

        info!(grain_type, "Directory stopped");
    }

    fn route(&mut self, id: G::Id, envelope: Envelope<G>, context: &G::Context) {
        let Some(slot) = self.activations.get_mut(&id) else {
            self.activate(id, vec![envelope], context);
            return;
        };
        let envelope = match slot.mailbox.send(envelope) {
            Ok(()) => return,
            Err(SendError(envelope)) => envelope,
        };
        if !slot.handle.is_finished() {
            debug!(grain_type = G::GRAIN_TYPE, %id, "Activation deactivating, holding call");
            slot.held.push(envelope);
            return;
        }

        // The task ended without reporting back (it panicked).
        debug!(grain_type = G::GRAIN_TYPE, %id, "Activation gone, reactivating");
        let mut pending = self
            .activations
            .remove(&id)
            .map(|slot| slot.held)
            .unwrap_or_default();
        pending.push(envelope);
        self.activate(id, pending, context);
    }

    fn evicted(&mut self, id: G::Id, context: &G::Context) {
        // A fresh activation may already own this id.
        let stale = self
            .activations
            .get(&id)
            .is_some_and(|slot| slot.mailbox.is_closed());
        if !stale {
            return;
        }
        let held = self
            .activations
            .remove(&id)
            .map(|slot| slot.held)
            .unwrap_or_default();
        debug!(
            grain_type = G::GRAIN_TYPE,
            %id,
            held = held.len(),
            active = self.activations.len(),
            "Evicted"
        );
        if !held.is_empty() {
            self.activate(id, held, context);
        }
    }

    /// Spawns an activation for `id` and queues `pending` on its mailbox.
    fn activate(&mut self, id: G::Id, pending: Vec<Envelope<G>>, context: &G::Context) {
        let (mailbox, receiver) = mpsc::unbounded_channel();
        info!(
            grain_type = G::GRAIN_TYPE,
            %id,
            active = self.activations.len() + 1,
            "Activating"
        );
        for envelope in pending {
            if let Err(SendError(envelope)) = mailbox.send(envelope) {
                let _ = envelope
                    .respond_to
                    .send(Err(InvocationError::ActivationDropped));
            }
        }
        let activation = Activation::new(
            id.clone(),
            receiver,
            self.weak_sender.clone(),
            self.idle_timeout,
        );
        let handle = tokio::spawn(activation.run(context.clone()));
        self.activations.insert(
            id,
            Slot {
                mailbox,
                handle,
                held: Vec::new(),
            },
        );
    }

    /// Stops accepting calls, lets every activation finish its queue and waits for them.
    async fn drain(&mut self) {
        let grain_type = G::GRAIN_TYPE;
        self.receiver.close();

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(self.activations.len());
        for (_, slot) in self.activations.drain() {
            // Dropping the sender ends the activation once its queue is empty.
            drop(slot.mailbox);
            for envelope in slot.held {
                let _ = envelope
                    .respond_to
                    .send(Err(InvocationError::SiloUnavailable));
            }
            handles.push(slot.handle);
        }
        info!(grain_type, activations = handles.len(), "Draining");

        for handle in handles {
            if let Err(e) = handle.await {
                error!(grain_type, "Activation task failed: {:?}", e);
            }
        }

        // Calls that reached the directory after shutdown was requested.
        while let Some(request) = self.receiver.recv().await {
            match request {
                DirectoryRequest::Invoke { envelope, .. } => {
                    let _ = envelope
                        .respond_to
                        .send(Err(InvocationError::SiloUnavailable));
                }
                DirectoryRequest::Shutdown { respond_to } => {
                    let _ = respond_to.send(());
                }
                DirectoryRequest::Evicted { .. } => {}
            }
        }
    }
}
