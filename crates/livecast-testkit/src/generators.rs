//! Proptest generators for property-based testing.

use proptest::prelude::*;

use livecast_registry::{SessionDescriptor, StatsUpdate};
use livecast_token::{
    CapabilityToken, FixedClock, FixedSalt, PrivilegePolicy, Role, SigningCredentials,
    TokenIssuer,
};

/// Generate an app id or certificate: 32 hex characters.
pub fn hex_secret() -> impl Strategy<Value = String> {
    "[0-9a-f]{32}".prop_map(String::from)
}

/// Generate a channel name.
pub fn channel() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,64}".prop_map(String::from)
}

/// Generate a subject id, including the unassigned subject 0.
pub fn subject() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), 1u32..=u32::MAX]
}

/// Generate a role.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Publisher), Just(Role::Subscriber)]
}

/// Generate a privilege policy.
pub fn policy() -> impl Strategy<Value = PrivilegePolicy> {
    prop_oneof![Just(PrivilegePolicy::Uniform), Just(PrivilegePolicy::RoleScoped)]
}

/// Generate a partial stats update.
pub fn stats_update() -> impl Strategy<Value = StatsUpdate> {
    (
        any::<Option<u32>>(),
        any::<Option<u32>>(),
        any::<Option<u32>>(),
    )
        .prop_map(|(viewers, likes, comments)| StatsUpdate {
            viewer_count: viewers.map(u64::from),
            likes: likes.map(u64::from),
            comments: comments.map(u64::from),
        })
}

/// Generate a valid session descriptor.
pub fn descriptor() -> impl Strategy<Value = SessionDescriptor> {
    (
        "u[0-9]{1,6}",
        "[A-Za-z][A-Za-z ?&]{0,40}",
        channel(),
        prop::collection::vec("[a-z]{3,10}", 0..4),
        any::<bool>(),
    )
        .prop_map(|(broadcaster, title, channel, tags, private)| {
            tags.into_iter().fold(
                SessionDescriptor::new(broadcaster, title, channel).private(private),
                |d, tag| d.tag(tag),
            )
        })
}

/// Parameters for issuing a token.
#[derive(Debug, Clone)]
pub struct IssueParams {
    pub credentials: SigningCredentials,
    pub channel: String,
    pub subject: u32,
    pub role: Role,
    pub policy: PrivilegePolicy,
    pub issued_at: u32,
    pub salt: u32,
    pub validity_secs: u32,
}

impl Arbitrary for IssueParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            hex_secret(),
            hex_secret(),
            channel(),
            subject(),
            role(),
            policy(),
            0u32..=2_000_000_000u32, // issued_at
            any::<u32>(),            // salt
            1u32..=1_000_000u32,     // validity
        )
            .prop_map(
                |(app_id, cert, channel, subject, role, policy, issued_at, salt, validity_secs)| {
                    IssueParams {
                        credentials: SigningCredentials::new(app_id, cert),
                        channel,
                        subject,
                        role,
                        policy,
                        issued_at,
                        salt,
                        validity_secs,
                    }
                },
            )
            .boxed()
    }
}

/// Issue a token from parameters.
pub fn issue_from_params(params: &IssueParams) -> livecast_token::Result<CapabilityToken> {
    TokenIssuer::with_sources(
        params.credentials.clone(),
        FixedClock::new(params.issued_at),
        FixedSalt(params.salt),
    )
    .with_policy(params.policy)
    .issue(&params.channel, params.subject, params.role, params.validity_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecast_token::{compute_signature, DecodedToken};

    proptest! {
        #[test]
        fn test_issuance_deterministic(params: IssueParams) {
            let t1 = issue_from_params(&params).unwrap();
            let t2 = issue_from_params(&params).unwrap();

            prop_assert_eq!(t1.as_str(), t2.as_str());
        }

        #[test]
        fn test_token_parses_back(params: IssueParams) {
            let token = issue_from_params(&params).unwrap();
            let decoded = DecodedToken::parse(token.as_str(), &params.credentials.app_id).unwrap();

            prop_assert!(token.as_str().starts_with("007"));
            prop_assert_eq!(decoded.message.salt, params.salt);
            prop_assert_eq!(decoded.message.issued_at, params.issued_at);
            let expected = params.policy.privileges_for(params.role).len();
            prop_assert_eq!(decoded.message.privileges.len(), expected);
            for (_, expiry) in decoded.message.privileges.iter() {
                prop_assert_eq!(expiry, params.issued_at + params.validity_secs);
            }
        }

        #[test]
        fn test_tampered_message_changes_signature(
            params in any::<IssueParams>(),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255u8,
        ) {
            let token = issue_from_params(&params).unwrap();
            let decoded = DecodedToken::parse(token.as_str(), &params.credentials.app_id).unwrap();

            let mut tampered = decoded.message_bytes.clone();
            let i = index.index(tampered.len());
            tampered[i] ^= flip;

            let recomputed = compute_signature(
                &params.credentials.app_certificate,
                &params.credentials.app_id,
                &params.channel,
                params.subject,
                &tampered,
            );
            prop_assert_ne!(recomputed, decoded.signature);
        }

        #[test]
        fn test_descriptors_are_valid(d in descriptor()) {
            prop_assert!(d.missing_fields().is_empty());
        }
    }
}
