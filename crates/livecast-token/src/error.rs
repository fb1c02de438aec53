//! Error types for token issuance and parsing.

use thiserror::Error;

/// Errors that can occur while issuing or parsing a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signing credentials are missing or empty.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `issued_at + window` does not fit the u32 expiry field.
    #[error("expiry overflows u32: issued_at {issued_at} + window {window}")]
    ExpiryOverflow { issued_at: u32, window: u32 },

    /// The token string is structurally invalid.
    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Result type for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;
