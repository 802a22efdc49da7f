use crate::clock::{Clock, SystemClock};
use grain_framework::StreamProvider;
use std::sync::Arc;

/// Shared by every chat room activation.
#[derive(Clone)]
pub struct ChatRoomContext {
    pub streams: StreamProvider,
    pub clock: Arc<dyn Clock>,
}

impl ChatRoomContext {
    pub fn new(streams: StreamProvider) -> Self {
        Self {
            streams,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
