//! Token issuance.
//!
//! Issuing is a four-step pipeline: build the privilege message, sign it,
//! pack signature and message into content, and wrap the content with the
//! app id and version tag. See [`crate::wire`] for the byte layout.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::credentials::SigningCredentials;
use crate::crypto::{compute_signature, Signature};
use crate::error::{Result, TokenError};
use crate::privilege::{PrivilegeMessage, PrivilegePolicy, PrivilegeSet, Role};
use crate::source::{Clock, RandomSalt, SaltSource, SystemClock};
use crate::wire::{encode_token, TOKEN_VERSION};

/// Default validity window: one day.
pub const DEFAULT_VALIDITY_SECS: u32 = 86_400;

/// An issued capability token.
///
/// Immutable. Only [`CapabilityToken::as_str`] is meant to leave the process;
/// the other fields describe what went into it.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityToken {
    #[serde(skip)]
    version: &'static str,
    #[serde(skip)]
    app_id: String,
    #[serde(skip)]
    signature: Signature,
    #[serde(skip)]
    message: PrivilegeMessage,
    channel: String,
    subject: u32,
    role: Role,
    expires_at: u32,
    token: String,
}

impl CapabilityToken {
    /// The transmitted token string.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn version(&self) -> &str {
        self.version
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn message(&self) -> &PrivilegeMessage {
        &self.message
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn subject(&self) -> u32 {
        self.subject
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn issued_at(&self) -> u32 {
        self.message.issued_at
    }

    /// Latest expiry across all granted privileges.
    pub fn expires_at(&self) -> u32 {
        self.expires_at
    }

    /// Consume and return the token string.
    pub fn into_string(self) -> String {
        self.token
    }
}

impl fmt::Display for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl fmt::Debug for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityToken")
            .field("channel", &self.channel)
            .field("subject", &self.subject)
            .field("role", &self.role)
            .field("issued_at", &self.message.issued_at)
            .field("expires_at", &self.expires_at)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Issues capability tokens.
///
/// Stateless apart from its configuration; share it freely across tasks.
pub struct TokenIssuer<C: Clock = SystemClock, S: SaltSource = RandomSalt> {
    credentials: SigningCredentials,
    policy: PrivilegePolicy,
    clock: C,
    salt: S,
}

impl TokenIssuer {
    /// Create an issuer backed by the wall clock and thread RNG.
    pub fn new(credentials: SigningCredentials) -> Self {
        Self::with_sources(credentials, SystemClock, RandomSalt)
    }
}

impl<C: Clock, S: SaltSource> TokenIssuer<C, S> {
    /// Create an issuer with explicit time and salt sources.
    pub fn with_sources(credentials: SigningCredentials, clock: C, salt: S) -> Self {
        Self {
            credentials,
            policy: PrivilegePolicy::default(),
            clock,
            salt,
        }
    }

    /// Set how roles map to privileges.
    pub fn with_policy(mut self, policy: PrivilegePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PrivilegePolicy {
        self.policy
    }

    pub fn credentials(&self) -> &SigningCredentials {
        &self.credentials
    }

    /// Issue a token valid for [`DEFAULT_VALIDITY_SECS`].
    pub fn issue_default(&self, channel: &str, subject: u32, role: Role) -> Result<CapabilityToken> {
        self.issue(channel, subject, role, DEFAULT_VALIDITY_SECS)
    }

    /// Issue a token for `channel`.
    ///
    /// `subject == 0` leaves the subject to be assigned at join time.
    pub fn issue(
        &self,
        channel: &str,
        subject: u32,
        role: Role,
        validity_secs: u32,
    ) -> Result<CapabilityToken> {
        self.credentials.ensure_configured()?;

        let issued_at = self.clock.unix_seconds();
        let expires_at = issued_at
            .checked_add(validity_secs)
            .ok_or(TokenError::ExpiryOverflow {
                issued_at,
                window: validity_secs,
            })?;

        let message = PrivilegeMessage {
            salt: self.salt.next_salt(),
            issued_at,
            privileges: PrivilegeSet::uniform(self.policy.privileges_for(role), expires_at),
        };
        let message_bytes = message.encode();

        let signature = compute_signature(
            &self.credentials.app_certificate,
            &self.credentials.app_id,
            channel,
            subject,
            &message_bytes,
        );
        let token = encode_token(&self.credentials.app_id, &signature, &message_bytes)?;

        debug!(
            channel,
            subject,
            role = role.as_str(),
            issued_at,
            expires_at,
            "issued capability token"
        );

        Ok(CapabilityToken {
            version: TOKEN_VERSION,
            app_id: self.credentials.app_id.clone(),
            signature,
            message,
            channel: channel.to_string(),
            subject,
            role,
            expires_at,
            token,
        })
    }
}

impl<C: Clock, S: SaltSource> fmt::Debug for TokenIssuer<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("credentials", &self.credentials)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privilege::{Privilege, CANONICAL_ORDER};
    use crate::source::{FixedClock, FixedSalt};
    use crate::wire::DecodedToken;

    const NOW: u32 = 1_736_870_400; // 2025-01-14T16:00:00Z

    fn creds() -> SigningCredentials {
        SigningCredentials::new("app-id-1234", "cert-abcdef")
    }

    fn fixed_issuer() -> TokenIssuer<FixedClock, FixedSalt> {
        TokenIssuer::with_sources(creds(), FixedClock::new(NOW), FixedSalt(0xDEAD_BEEF))
    }

    #[test]
    fn test_missing_credentials_fail_first() {
        let issuer = TokenIssuer::with_sources(
            SigningCredentials::new("", "cert"),
            FixedClock::new(u32::MAX),
            FixedSalt(0),
        );
        // Would overflow too, but configuration is checked before anything else.
        let err = issuer.issue("ch", 1, Role::Publisher, 10).unwrap_err();
        assert!(matches!(err, TokenError::Configuration(_)));

        let issuer = TokenIssuer::new(SigningCredentials::new("app", ""));
        assert!(matches!(
            issuer.issue_default("ch", 1, Role::Subscriber),
            Err(TokenError::Configuration(_))
        ));
    }

    #[test]
    fn test_fixed_sources_are_deterministic() {
        let issuer = fixed_issuer();
        let a = issuer.issue("ch1", 42, Role::Publisher, 3_600).unwrap();
        let b = issuer.issue("ch1", 42, Role::Publisher, 3_600).unwrap();
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.issued_at(), NOW);
        assert_eq!(a.expires_at(), NOW + 3_600);
        assert_eq!(a.version(), "007");
    }

    #[test]
    fn test_message_carries_all_privileges() {
        let token = fixed_issuer().issue_default("ch1", 0, Role::Subscriber).unwrap();
        let decoded = DecodedToken::parse(token.as_str(), "app-id-1234").unwrap();

        assert_eq!(decoded.message.salt, 0xDEAD_BEEF);
        assert_eq!(decoded.message.issued_at, NOW);
        let kinds: Vec<u16> = decoded.message.privileges.iter().map(|(k, _)| k).collect();
        let expected: Vec<u16> = CANONICAL_ORDER.iter().map(|p| p.to_u16()).collect();
        assert_eq!(kinds, expected);
        for (_, expiry) in decoded.message.privileges.iter() {
            assert_eq!(expiry, NOW + DEFAULT_VALIDITY_SECS);
        }
    }

    #[test]
    fn test_embedded_signature_matches_recomputation() {
        let token = fixed_issuer().issue("room", 7, Role::Publisher, 60).unwrap();
        let decoded = DecodedToken::parse(token.as_str(), "app-id-1234").unwrap();

        let expected = compute_signature("cert-abcdef", "app-id-1234", "room", 7, &decoded.message_bytes);
        assert_eq!(decoded.signature, expected);
        assert_eq!(*token.signature(), expected);
    }

    #[test]
    fn test_random_salt_changes_signature() {
        let issuer = TokenIssuer::with_sources(creds(), FixedClock::new(NOW), RandomSalt);
        let a = issuer.issue("ch1", 1, Role::Publisher, 60).unwrap();
        let b = issuer.issue("ch1", 1, Role::Publisher, 60).unwrap();
        // 1 in 2^32 chance of equal salts.
        assert_ne!(a.signature(), b.signature());
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_role_scoped_policy() {
        let issuer = fixed_issuer().with_policy(PrivilegePolicy::RoleScoped);
        let sub = issuer.issue_default("ch", 1, Role::Subscriber).unwrap();
        assert_eq!(sub.message().privileges.len(), 2);
        assert!(sub.message().privileges.contains(Privilege::JoinChannel));
        assert!(!sub.message().privileges.contains(Privilege::PublishVideoStream));

        let publisher = issuer.issue_default("ch", 1, Role::Publisher).unwrap();
        assert_eq!(publisher.message().privileges.len(), 5);
        assert_eq!(
            publisher.message().privileges.expiry(Privilege::SignIn),
            Some(NOW + DEFAULT_VALIDITY_SECS)
        );
        assert_eq!(sub.message().privileges.expiry(Privilege::PublishAudioStream), None);
    }

    #[test]
    fn test_issuer_exposes_configuration() {
        let issuer = fixed_issuer();
        assert_eq!(issuer.policy(), PrivilegePolicy::Uniform);
        assert_eq!(issuer.credentials().app_id, "app-id-1234");
        assert_eq!(
            issuer.with_policy(PrivilegePolicy::RoleScoped).policy(),
            PrivilegePolicy::RoleScoped
        );
    }

    #[test]
    fn test_expiry_overflow() {
        let issuer = TokenIssuer::with_sources(creds(), FixedClock::new(u32::MAX - 10), FixedSalt(1));
        assert_eq!(
            issuer.issue("ch", 1, Role::Publisher, 11).unwrap_err(),
            TokenError::ExpiryOverflow {
                issued_at: u32::MAX - 10,
                window: 11
            }
        );
        assert!(issuer.issue("ch", 1, Role::Publisher, 10).is_ok());
    }

    #[test]
    fn test_debug_hides_token_and_secret() {
        let token = fixed_issuer().issue_default("ch", 1, Role::Publisher).unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains(token.as_str()));
        assert!(!format!("{:?}", fixed_issuer()).contains("cert-abcdef"));
    }

    #[test]
    fn test_serializes_public_view() {
        let token = fixed_issuer().issue("ch", 9, Role::Subscriber, 5).unwrap();
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["channel"], "ch");
        assert_eq!(json["subject"], 9);
        assert_eq!(json["role"], "subscriber");
        assert_eq!(json["expiresAt"], NOW + 5);
        assert_eq!(json["token"], token.as_str());
        assert!(json.get("signature").is_none());
    }
}
