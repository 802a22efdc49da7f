//! Error types for the ChatRoom grain.

use grain_framework::InvocationError;
use thiserror::Error;

/// Errors that can occur during chat room operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChatRoomError {
    /// Malformed input; the room's state is unchanged.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The room answered with a reply that does not fit the call.
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    /// An error occurred while communicating with the silo.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ChatRoomError {
    /// Recovers the room's own error from a failed call, or wraps the transport failure.
    pub fn from_invocation(e: InvocationError) -> Self {
        match e {
            InvocationError::GrainError(inner) => match inner.downcast::<ChatRoomError>() {
                Ok(err) => *err,
                Err(other) => ChatRoomError::ActorCommunicationError(other.to_string()),
            },
            other => ChatRoomError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grain_errors_are_unwrapped() {
        let e = InvocationError::GrainError(Box::new(ChatRoomError::InvalidArgument(
            "participant".to_string(),
        )));
        assert_eq!(
            ChatRoomError::from_invocation(e),
            ChatRoomError::InvalidArgument("participant".to_string())
        );
    }

    #[test]
    fn transport_errors_become_communication_errors() {
        let e = ChatRoomError::from_invocation(InvocationError::SiloUnavailable);
        assert_eq!(
            e,
            ChatRoomError::ActorCommunicationError("Silo unavailable".to_string())
        );
    }
}
