use super::calls::{TickResult, TickerCall, TickerReply};
use super::error::TickerError;
use super::work::{SpinWork, WorkUnit};
use async_trait::async_trait;
use grain_framework::Grain;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The single identity every client addresses the ticker by.
pub const TICKER_ID: u64 = 0;

/// Upper bound on `units` for one call.
pub const MAX_UNITS_PER_TICK: u32 = 10_000;

#[derive(Clone)]
pub struct TickerContext {
    pub work: Arc<dyn WorkUnit>,
}

impl TickerContext {
    pub fn new(work: Arc<dyn WorkUnit>) -> Self {
        Self { work }
    }
}

impl Default for TickerContext {
    fn default() -> Self {
        Self::new(Arc::new(SpinWork::default()))
    }
}

pub struct Ticker {
    id: u64,
    calls: u64,
}

impl Ticker {
    fn run_units(&self, units: u32, work: &dyn WorkUnit) -> (u32, u32) {
        let mut failed = 0;
        for unit in 0..units {
            let outcome = catch_unwind(AssertUnwindSafe(|| work.run(self.calls, unit)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => {
                    warn!(call_number = self.calls, unit, %reason, "Work unit failed");
                    failed += 1;
                }
                Err(_) => {
                    warn!(call_number = self.calls, unit, "Work unit panicked");
                    failed += 1;
                }
            }
        }
        (units - failed, failed)
    }
}

#[async_trait]
impl Grain for Ticker {
    const GRAIN_TYPE: &'static str = "Ticker";
    type Id = u64;
    type Call = TickerCall;
    type Reply = TickerReply;
    type Context = TickerContext;
    type Error = TickerError;

    fn activate(id: &u64) -> Self {
        Self { id: *id, calls: 0 }
    }

    async fn on_deactivate(&mut self, _ctx: &TickerContext) -> Result<(), TickerError> {
        info!(id = self.id, calls = self.calls, "Ticker stopped");
        Ok(())
    }

    async fn handle(
        &mut self,
        call: TickerCall,
        ctx: &TickerContext,
    ) -> Result<TickerReply, TickerError> {
        let TickerCall::Tick { units } = call;
        if units > MAX_UNITS_PER_TICK {
            return Err(TickerError::InvalidArgument(format!(
                "at most {} units per tick, got {}",
                MAX_UNITS_PER_TICK, units
            )));
        }

        self.calls += 1;
        let started = Instant::now();
        let (units_completed, units_failed) = self.run_units(units, ctx.work.as_ref());
        let result = TickResult {
            call_number: self.calls,
            units_requested: units,
            units_completed,
            units_failed,
            elapsed: started.elapsed(),
        };
        debug!(?result, "Tick");
        Ok(TickerReply::Ticked(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fails odd units and panics on unit 4.
    struct Flaky;

    impl WorkUnit for Flaky {
        fn run(&self, _call_number: u64, unit: u32) -> Result<(), String> {
            if unit == 4 {
                panic!("unit 4 exploded");
            }
            if unit % 2 == 1 {
                return Err(format!("unit {} failed", unit));
            }
            Ok(())
        }
    }

    fn ticked(reply: TickerReply) -> TickResult {
        let TickerReply::Ticked(result) = reply;
        result
    }

    #[tokio::test]
    async fn tick_reports_full_completion() {
        let ctx = TickerContext::new(Arc::new(SpinWork::new(10)));
        let mut ticker = Ticker::activate(&TICKER_ID);

        let first = ticked(ticker.handle(TickerCall::Tick { units: 10 }, &ctx).await.unwrap());
        let second = ticked(ticker.handle(TickerCall::Tick { units: 10 }, &ctx).await.unwrap());

        assert!(first.is_complete());
        assert_eq!(first.units_completed, 10);
        assert_eq!(first.call_number, 1);
        assert_eq!(second.call_number, 2);
    }

    #[tokio::test]
    async fn unit_failures_and_panics_do_not_abort_the_call() {
        let ctx = TickerContext::new(Arc::new(Flaky));
        let mut ticker = Ticker::activate(&TICKER_ID);

        let result = ticked(ticker.handle(TickerCall::Tick { units: 10 }, &ctx).await.unwrap());

        // Units 1, 3, 5, 7, 9 fail and unit 4 panics.
        assert_eq!(result.units_failed, 6);
        assert_eq!(result.units_completed, 4);
        assert!(!result.is_complete());
    }

    #[tokio::test]
    async fn oversized_tick_is_rejected() {
        let ctx = TickerContext::default();
        let mut ticker = Ticker::activate(&TICKER_ID);

        let err = ticker
            .handle(
                TickerCall::Tick {
                    units: MAX_UNITS_PER_TICK + 1,
                },
                &ctx,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TickerError::InvalidArgument(_)));
        assert_eq!(ticker.calls, 0);
    }
}
