//! # Connection Bootstrapper
//!
//! Turns a [`ClusterConnector`] into a live [`ClusterClient`], retrying failed connects
//! according to a [`RetryStrategy`]. A connect that errors and a connect that yields a
//! client which is not initialized both count as a failed attempt. After
//! `max_retries() + 1` failed attempts the bootstrapper gives up with
//! [`BootstrapError::Exhausted`]. Progress lines go to a console sink; a sink that fails
//! to take them is logged and never cuts the retries short.

pub mod error;
pub mod retry;
pub mod sleeper;

pub use error::BootstrapError;
pub use retry::{FixedIntervalStrategy, NoIntervalStrategy, RetryStrategy};
pub use sleeper::{Sleeper, TokioSleeper};

use colored::Colorize;
use grain_framework::{ClusterClient, ClusterConnector, ClusterEndpoint};
use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Bootstrapper {
    endpoint: ClusterEndpoint,
    strategy: Box<dyn RetryStrategy>,
    sleeper: Arc<dyn Sleeper>,
}

impl Bootstrapper {
    pub fn new(endpoint: ClusterEndpoint, strategy: Box<dyn RetryStrategy>) -> Self {
        Self {
            endpoint,
            strategy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Connects, printing each failure to `out`.
    pub async fn connect<C, W>(
        &mut self,
        connector: &C,
        out: &mut W,
    ) -> Result<ClusterClient, BootstrapError>
    where
        C: ClusterConnector + ?Sized,
        W: Write,
    {
        let max_attempts = self.strategy.max_retries() + 1;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match connector.connect(&self.endpoint).await {
                Ok(client) if client.is_initialized() => {
                    info!(endpoint = %self.endpoint, attempt, "Connected to cluster");
                    return Ok(client);
                }
                Ok(client) => {
                    client.close();
                    last_error = "client is not initialized".to_string();
                }
                Err(e) => last_error = e.to_string(),
            }

            warn!(
                endpoint = %self.endpoint,
                attempt,
                max_attempts,
                error = %last_error,
                "Cluster connect failed"
            );
            print(out, last_error.cyan());

            if attempt == max_attempts {
                break;
            }
            match self.strategy.next_backoff() {
                Some(delay) => {
                    print(out, format!("Client init failed. Sleeping {:?}...", delay).red());
                    self.sleeper.sleep(delay).await;
                }
                None => print(out, "Client init failed. Retrying...".red()),
            }
        }

        Err(BootstrapError::Exhausted {
            attempts: max_attempts,
            last_error,
        })
    }
}

fn print<W: Write>(out: &mut W, line: impl Display) {
    if let Err(e) = writeln!(out, "{}", line) {
        warn!(error = %e, "Console write failed");
    }
}
