//! Signing credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TokenError};

/// Environment variable holding the application identity.
pub const APP_ID_ENV: &str = "LIVECAST_APP_ID";

/// Environment variable holding the shared secret certificate.
pub const APP_CERTIFICATE_ENV: &str = "LIVECAST_APP_CERTIFICATE";

/// Application identity and shared secret used to sign tokens.
///
/// Empty values are allowed here; they are rejected when a token is issued.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningCredentials {
    /// Application identity, embedded in every token in clear.
    pub app_id: String,
    /// HMAC key. Never serialized.
    #[serde(skip_serializing, default)]
    pub app_certificate: String,
}

impl SigningCredentials {
    pub fn new(app_id: impl Into<String>, app_certificate: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_certificate: app_certificate.into(),
        }
    }

    /// Read credentials from `LIVECAST_APP_ID` and `LIVECAST_APP_CERTIFICATE`.
    ///
    /// Unset variables become empty strings.
    pub fn from_env() -> Self {
        Self {
            app_id: std::env::var(APP_ID_ENV).unwrap_or_default(),
            app_certificate: std::env::var(APP_CERTIFICATE_ENV).unwrap_or_default(),
        }
    }

    /// Check that both values are present.
    pub fn ensure_configured(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.app_id.trim().is_empty() {
            missing.push("app_id");
        }
        if self.app_certificate.trim().is_empty() {
            missing.push("app_certificate");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TokenError::Configuration(format!(
                "missing signing credentials: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn is_configured(&self) -> bool {
        self.ensure_configured().is_ok()
    }
}

impl fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"<redacted>")
            .finish()
    }
}
