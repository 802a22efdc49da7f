//! # Mock Framework & Testing Guide
//!
//! `MockGrain<G>` stands in for a silo directory: the [`GrainRef`] it hands out delivers
//! calls to an in-memory expectation queue instead of a real activation. This keeps client
//! and session tests fast and deterministic, and makes failures trivial to inject.
//!
//! ## When to use Mocks vs a Real Silo
//!
//! | Feature | MockGrain | Real Silo |
//! |---------|-----------|-----------|
//! | **Speed** | Instant (in-memory) | Fast (spawns directory + activation tasks) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler |
//! | **State** | No real state (expectations) | Real grain state |
//! | **Error Injection** | Easy (`return_err`) | Needs a grain that fails |
//!
//! ## Testing Strategies
//!
//! **Pattern 0: Client logic against a raw receiver.** Use [`create_mock_ref`] and
//! [`expect_invoke`] to assert on the exact call a client sends and answer it by hand:
//!
//! ```rust,ignore
//! let (grain, mut receiver) = create_mock_ref::<Ticker>(TICKER_ID, 10);
//! let client = TickerClient::new(grain);
//! let task = tokio::spawn(async move { client.tick(10).await });
//!
//! let (_id, call, responder) = expect_invoke(&mut receiver).await.unwrap();
//! assert!(matches!(call, TickerCall::Tick { units: 10 }));
//! responder.send(Ok(TickerReply::Ticked(result))).unwrap();
//! ```
//!
//! **Pattern 1: Scripted replies.** Use [`MockGrain`] to queue replies up front and check
//! with [`MockGrain::verify`] that every one was consumed:
//!
//! ```rust,ignore
//! let mut mock = MockGrain::<Ticker>::new(TICKER_ID);
//! mock.expect_invoke().return_ok(TickerReply::Ticked(result));
//! mock.expect_invoke().return_err(InvocationError::ActivationDropped);
//!
//! let client = TickerClient::new(mock.grain_ref());
//! assert!(client.tick(10).await.is_ok());
//! assert!(client.tick(10).await.is_err());
//! mock.verify();
//! ```
//!
//! **Pattern 2: Full silo.** Start a real [`Silo`](crate::Silo) and connect through its
//! gateway when the grain behaviour itself is under test.

use crate::error::InvocationError;
use crate::grain::Grain;
use crate::grain_ref::GrainRef;
use crate::message::{DirectoryRequest, Envelope, Response};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

type Expectations<G> = Arc<Mutex<VecDeque<Result<<G as Grain>::Reply, InvocationError>>>>;

/// A mock directory with an expectation queue.
///
/// Each call received pops the next queued reply. A call with no reply left panics the
/// background task, which surfaces to the caller as [`InvocationError::ActivationDropped`].
pub struct MockGrain<G: Grain> {
    grain_ref: GrainRef<G>,
    expectations: Expectations<G>,
    invocations: Arc<AtomicUsize>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<G: Grain> MockGrain<G> {
    /// Creates a mock for identity `id` with no expectations.
    pub fn new(id: G::Id) -> Self {
        let (sender, mut receiver) = mpsc::channel::<DirectoryRequest<G>>(100);
        let expectations: Expectations<G> = Arc::new(Mutex::new(VecDeque::new()));
        let invocations = Arc::new(AtomicUsize::new(0));
        let queue = expectations.clone();
        let counter = invocations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let DirectoryRequest::Invoke { envelope, .. } = request else {
                    continue;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let next = queue.lock().unwrap().pop_front();
                match next {
                    Some(response) => {
                        let _ = envelope.respond_to.send(response);
                    }
                    None => panic!("Unexpected call: {:?}", envelope.call),
                }
            }
        });

        Self {
            grain_ref: GrainRef::new(id, sender, Arc::new(AtomicBool::new(true))),
            expectations,
            invocations,
            _handle: handle,
        }
    }

    /// Returns a reference routed to this mock.
    pub fn grain_ref(&self) -> GrainRef<G> {
        self.grain_ref.clone()
    }

    /// Expects one more call.
    pub fn expect_invoke(&mut self) -> InvokeExpectationBuilder<G> {
        InvokeExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Number of calls received so far.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder for one expected call.
pub struct InvokeExpectationBuilder<G: Grain> {
    expectations: Expectations<G>,
}

impl<G: Grain> InvokeExpectationBuilder<G> {
    /// Sets the expectation to return a successful reply.
    pub fn return_ok(self, reply: G::Reply) {
        self.expectations.lock().unwrap().push_back(Ok(reply));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: InvocationError) {
        self.expectations.lock().unwrap().push_back(Err(error));
    }
}

// =============================================================================
// RAW RECEIVER HELPERS
// =============================================================================

/// Creates a reference whose calls land on the returned receiver.
pub fn create_mock_ref<G: Grain>(
    id: G::Id,
    buffer_size: usize,
) -> (GrainRef<G>, mpsc::Receiver<DirectoryRequest<G>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (
        GrainRef::new(id, sender, Arc::new(AtomicBool::new(true))),
        receiver,
    )
}

/// Waits for the next call; `None` if the channel closed or something else arrived.
pub async fn expect_invoke<G: Grain>(
    receiver: &mut mpsc::Receiver<DirectoryRequest<G>>,
) -> Option<(G::Id, G::Call, Response<G::Reply>)> {
    match receiver.recv().await {
        Some(DirectoryRequest::Invoke {
            id,
            envelope: Envelope { call, respond_to },
        }) => Some((id, call, respond_to)),
        _ => None,
    }
}
