//! # Framework Errors
//!
//! This module defines the error types shared by every grain and client.
//! [`InvocationError`] covers a single call routed through the silo,
//! [`ConnectionError`] covers establishing a [`ClusterClient`](crate::ClusterClient).

/// Errors that can occur while routing or executing one grain call.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// The directory for this grain type is no longer accepting calls (silo stopped).
    #[error("Silo unavailable")]
    SiloUnavailable,
    /// The activation went away before replying.
    #[error("Activation dropped response channel")]
    ActivationDropped,
    /// The cluster client that produced this reference was closed.
    #[error("Connection closed")]
    ConnectionClosed,
    /// No directory is registered for the requested grain type.
    #[error("Unknown grain type: {0}")]
    UnknownGrainType(&'static str),
    /// The grain's `on_activate` hook rejected the activation.
    #[error("Activation of {grain_type}/{id} failed: {reason}")]
    ActivationFailed {
        grain_type: &'static str,
        id: String,
        reason: String,
    },
    /// The grain handled the call and returned its own error.
    #[error("Grain error: {0}")]
    GrainError(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised while connecting a client to a cluster.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectionError {
    #[error("Cluster id mismatch: expected '{expected}', got '{actual}'")]
    ClusterIdMismatch { expected: String, actual: String },
    #[error("Silo is stopped")]
    SiloStopped,
    #[error("Gateway unreachable: {0}")]
    Unreachable(String),
}
