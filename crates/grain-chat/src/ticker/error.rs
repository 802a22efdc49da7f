//! Error types for the Ticker grain.

use grain_framework::InvocationError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TickerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl TickerError {
    pub fn from_invocation(e: InvocationError) -> Self {
        match e {
            InvocationError::GrainError(inner) => match inner.downcast::<TickerError>() {
                Ok(err) => *err,
                Err(other) => TickerError::ActorCommunicationError(other.to_string()),
            },
            other => TickerError::ActorCommunicationError(other.to_string()),
        }
    }
}
