//! Retry strategies for the connection bootstrapper.
//!
//! The strategy trait and the fixed and no-interval strategies are adapted from the
//! supervision strategies of the kore-ledger rush-rs actor system (`actor/src/supervision.rs`).

use std::fmt::Debug;
use std::time::Duration;

/// Decides how many times to retry a failed connect and how long to wait in between.
pub trait RetryStrategy: Debug + Send + Sync {
    /// Retries after the first attempt. The bootstrapper makes `max_retries() + 1` attempts.
    fn max_retries(&self) -> usize;
    /// Wait before the next attempt; `None` retries immediately.
    fn next_backoff(&mut self) -> Option<Duration>;
}

/// Retries immediately.
#[derive(Debug, Default)]
pub struct NoIntervalStrategy {
    max_retries: usize,
}

impl NoIntervalStrategy {
    pub fn new(max_retries: usize) -> Self {
        NoIntervalStrategy { max_retries }
    }
}

impl RetryStrategy for NoIntervalStrategy {
    fn max_retries(&self) -> usize {
        self.max_retries
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        None
    }
}

/// Retries after a fixed wait.
#[derive(Debug, Default)]
pub struct FixedIntervalStrategy {
    max_retries: usize,
    duration: Duration,
}

impl FixedIntervalStrategy {
    pub fn new(max_retries: usize, duration: Duration) -> Self {
        FixedIntervalStrategy {
            max_retries,
            duration,
        }
    }
}

impl RetryStrategy for FixedIntervalStrategy {
    fn max_retries(&self) -> usize {
        self.max_retries
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        Some(self.duration)
    }
}
