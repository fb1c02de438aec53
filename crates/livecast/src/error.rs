//! Error types for the Livecast service.

use livecast_registry::RegistryError;
use livecast_token::TokenError;
use thiserror::Error;

/// Errors that can occur during Livecast operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LivecastError {
    /// Token issuance failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Registry operation failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl LivecastError {
    /// Check if this is a missing-session error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::NotFound(_)))
    }
}

/// Result type for Livecast operations.
pub type Result<T> = std::result::Result<T, LivecastError>;
