//! Error types for the registry and broadcaster.

use thiserror::Error;

use crate::session::SessionId;

/// Errors returned by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Required session fields are missing.
    #[error("validation error: {0}")]
    Validation(String),

    /// No live session has this id.
    #[error("session not found: {0}")]
    NotFound(SessionId),
}

/// Failure to hand an event to one observer.
///
/// Local to the broadcaster: it is logged and the observer is evicted.
/// Publishers never see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The observer's queue is full.
    #[error("observer queue full")]
    QueueFull,

    /// The observer dropped its receiving end.
    #[error("observer disconnected")]
    Disconnected,
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
