use crate::ticker::{TickResult, Ticker, TickerCall, TickerError, TickerReply};
use async_trait::async_trait;
use grain_framework::{GrainClient, GrainRef, InvocationError};
use tracing::instrument;

/// Client for the singleton Ticker grain.
#[derive(Clone)]
pub struct TickerClient {
    inner: GrainRef<Ticker>,
}

impl TickerClient {
    pub fn new(inner: GrainRef<Ticker>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn tick(&self, units: u32) -> Result<TickResult, TickerError> {
        let TickerReply::Ticked(result) = self.call(TickerCall::Tick { units }).await?;
        Ok(result)
    }
}

#[async_trait]
impl GrainClient<Ticker> for TickerClient {
    type Error = TickerError;

    fn grain(&self) -> &GrainRef<Ticker> {
        &self.inner
    }

    fn map_error(e: InvocationError) -> Self::Error {
        TickerError::from_invocation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticker::TICKER_ID;
    use grain_framework::mock::{create_mock_ref, expect_invoke, MockGrain};
    use std::time::Duration;

    fn result(call_number: u64) -> TickResult {
        TickResult {
            call_number,
            units_requested: 10,
            units_completed: 10,
            units_failed: 0,
            elapsed: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn tick_addresses_the_singleton() {
        let (grain, mut receiver) = create_mock_ref::<Ticker>(TICKER_ID, 10);
        let client = TickerClient::new(grain);

        let task = tokio::spawn(async move { client.tick(10).await });

        let (id, call, responder) = expect_invoke(&mut receiver).await.unwrap();
        assert_eq!(id, TICKER_ID);
        assert!(matches!(call, TickerCall::Tick { units: 10 }));
        responder.send(Ok(TickerReply::Ticked(result(1)))).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), result(1));
    }

    #[tokio::test]
    async fn transport_failure_maps_to_communication_error() {
        let mut mock = MockGrain::<Ticker>::new(TICKER_ID);
        mock.expect_invoke().return_ok(TickerReply::Ticked(result(1)));
        mock.expect_invoke()
            .return_err(InvocationError::ActivationDropped);

        let client = TickerClient::new(mock.grain_ref());
        assert!(client.tick(10).await.is_ok());
        assert!(matches!(
            client.tick(10).await,
            Err(TickerError::ActorCommunicationError(_))
        ));
        mock.verify();
    }
}
