//! Service configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use livecast_registry::DEFAULT_QUEUE_CAPACITY;
use livecast_token::credentials::{APP_CERTIFICATE_ENV, APP_ID_ENV};
use livecast_token::{PrivilegePolicy, SigningCredentials, DEFAULT_VALIDITY_SECS};

/// Environment variable overriding [`LivecastConfig::token_validity_secs`].
pub const TOKEN_VALIDITY_ENV: &str = "LIVECAST_TOKEN_VALIDITY_SECS";

/// Environment variable overriding [`LivecastConfig::observer_queue_capacity`].
pub const OBSERVER_QUEUE_ENV: &str = "LIVECAST_OBSERVER_QUEUE";

/// Configuration for a [`crate::Livecast`] service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivecastConfig {
    /// Signing credentials. May be empty; issuance then fails.
    pub credentials: SigningCredentials,
    /// Validity window of issued tokens, in seconds.
    pub token_validity_secs: u32,
    /// How roles map to privileges.
    pub privilege_policy: PrivilegePolicy,
    /// Events buffered per observer before it is evicted.
    pub observer_queue_capacity: usize,
}

impl Default for LivecastConfig {
    fn default() -> Self {
        Self {
            credentials: SigningCredentials::default(),
            token_validity_secs: DEFAULT_VALIDITY_SECS,
            privilege_policy: PrivilegePolicy::default(),
            observer_queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl LivecastConfig {
    /// Create a config with the given credentials and defaults for the rest.
    pub fn new(credentials: SigningCredentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    ///
    /// Missing credentials become empty strings. Numeric settings that are
    /// absent or fail to parse keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            credentials: SigningCredentials::new(
                lookup(APP_ID_ENV).unwrap_or_default(),
                lookup(APP_CERTIFICATE_ENV).unwrap_or_default(),
            ),
            token_validity_secs: parse_or(&lookup, TOKEN_VALIDITY_ENV, defaults.token_validity_secs),
            privilege_policy: defaults.privilege_policy,
            observer_queue_capacity: parse_or(
                &lookup,
                OBSERVER_QUEUE_ENV,
                defaults.observer_queue_capacity,
            ),
        }
    }

    pub fn with_validity(mut self, secs: u32) -> Self {
        self.token_validity_secs = secs;
        self
    }

    pub fn with_policy(mut self, policy: PrivilegePolicy) -> Self {
        self.privilege_policy = policy;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.observer_queue_capacity = capacity;
        self
    }
}

fn parse_or<T: std::str::FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LivecastConfig::default();
        assert_eq!(config.token_validity_secs, 86_400);
        assert_eq!(config.observer_queue_capacity, 256);
        assert_eq!(config.privilege_policy, PrivilegePolicy::Uniform);
        assert!(!config.credentials.is_configured());
    }

    #[test]
    fn test_from_lookup() {
        let config = LivecastConfig::from_lookup(lookup_from(&[
            ("LIVECAST_APP_ID", "app"),
            ("LIVECAST_APP_CERTIFICATE", "cert"),
            ("LIVECAST_TOKEN_VALIDITY_SECS", " 3600 "),
            ("LIVECAST_OBSERVER_QUEUE", "not-a-number"),
        ]));

        assert_eq!(config.credentials, SigningCredentials::new("app", "cert"));
        assert_eq!(config.token_validity_secs, 3_600);
        assert_eq!(config.observer_queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_empty_environment() {
        let config = LivecastConfig::from_lookup(|_| None);
        assert_eq!(config, LivecastConfig::default());
    }

    #[test]
    fn test_serialize_skips_certificate() {
        let config = LivecastConfig::new(SigningCredentials::new("app", "secret-cert"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"app_id\":\"app\""));
        assert!(!json.contains("secret-cert"));

        let back: LivecastConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.credentials.app_id, "app");
        assert_eq!(back.credentials.app_certificate, "");
    }
}
