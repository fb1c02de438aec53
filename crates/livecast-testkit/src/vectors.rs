//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the exact token string produced for fixed credentials,
//! time and salt. Any implementation of the token format must reproduce them
//! byte for byte.

use livecast_token::{
    CapabilityToken, FixedClock, FixedSalt, PrivilegePolicy, Role, SigningCredentials,
    TokenIssuer,
};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub app_id: &'static str,
    pub app_certificate: &'static str,
    pub channel: &'static str,
    pub subject: u32,
    pub role: Role,
    pub policy: PrivilegePolicy,
    /// Issue time, seconds since epoch.
    pub issued_at: u32,
    pub salt: u32,
    pub validity_secs: u32,
    /// Expected privilege message (hex).
    pub expected_message: &'static str,
    /// Expected HMAC-SHA256 signature (hex).
    pub expected_signature: &'static str,
    /// Expected token string.
    pub expected_token: &'static str,
}

const APP_ID: &str = "970CA35de60c44645bbae8a215061b33";
const APP_CERTIFICATE: &str = "5CFd2fd1755d40ecb72977518be15d3b";
const CHANNEL: &str = "7d72365eb983485397e3e3f9d460bdda";

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "publisher with numeric subject",
            app_id: APP_ID,
            app_certificate: APP_CERTIFICATE,
            channel: CHANNEL,
            subject: 2_882_341_273,
            role: Role::Publisher,
            policy: PrivilegePolicy::Uniform,
            issued_at: 1_111_111,
            salt: 1,
            validity_secs: 600,
            expected_message: "0100000047f410000500000001009ff6100002009ff6100003009ff6100004009ff61000e8039ff61000",
            expected_signature: "2fc6464bebfcf1b3eb61f82e309f5431fc8b093c799635b2379cbe76fd7f0a1c",
            expected_token: "007OTcwQ0EzNWRlNjBjNDQ2NDViYmFlOGEyMTUwNjFiMzNJQUF2eGtaTDYvenhzK3RoK0M0d24xUXgvSXNKUEhtV05iSTNuTDUyL1g4S0hDb0FBUUFBQUVmMEVBQUZBQUFBQVFDZjloQUFBZ0NmOWhBQUF3Q2Y5aEFBQkFDZjloQUE2QU9mOWhBQQ==",
        },
        GoldenVector {
            name: "subject zero signs no subject bytes",
            app_id: APP_ID,
            app_certificate: APP_CERTIFICATE,
            channel: CHANNEL,
            subject: 0,
            role: Role::Publisher,
            policy: PrivilegePolicy::Uniform,
            issued_at: 1_111_111,
            salt: 1,
            validity_secs: 600,
            expected_message: "0100000047f410000500000001009ff6100002009ff6100003009ff6100004009ff61000e8039ff61000",
            expected_signature: "774188620e9959c2a3c13613615ea55119e6294fcc200a3cb2ce328d80f5de87",
            expected_token: "007OTcwQ0EzNWRlNjBjNDQ2NDViYmFlOGEyMTUwNjFiMzNJQUIzUVloaURwbFp3cVBCTmhOaFhxVlJHZVlwVDh3Z0NqeXl6aktOZ1BYZWh5b0FBUUFBQUVmMEVBQUZBQUFBQVFDZjloQUFBZ0NmOWhBQUF3Q2Y5aEFBQkFDZjloQUE2QU9mOWhBQQ==",
        },
        GoldenVector {
            name: "role-scoped subscriber",
            app_id: APP_ID,
            app_certificate: APP_CERTIFICATE,
            channel: CHANNEL,
            subject: 2_882_341_273,
            role: Role::Subscriber,
            policy: PrivilegePolicy::RoleScoped,
            issued_at: 1_111_111,
            salt: 1,
            validity_secs: 600,
            expected_message: "0100000047f410000200000001009ff61000e8039ff61000",
            expected_signature: "1949006328842711b164769de7c93c2355ffd592f9d7f8d04c6088f476901f62",
            expected_token: "007OTcwQ0EzNWRlNjBjNDQ2NDViYmFlOGEyMTUwNjFiMzNJQUFaU1FCaktJUW5FYkZrZHAzbnlUd2pWZi9Wa3ZuWCtOQk1ZSWowZHBBZlloZ0FBUUFBQUVmMEVBQUNBQUFBQVFDZjloQUE2QU9mOWhBQQ==",
        },
        GoldenVector {
            name: "default window",
            app_id: "app-id-1234",
            app_certificate: "cert-abcdef",
            channel: "ch1",
            subject: 42,
            role: Role::Subscriber,
            policy: PrivilegePolicy::Uniform,
            issued_at: 1_736_870_400,
            salt: 0xDEAD_BEEF,
            validity_secs: 86_400,
            expected_message: "efbeadde008a866705000000010080db8767020080db8767030080db8767040080db8767e80380db8767",
            expected_signature: "6635e3a6c947c3f870cce911c50a00f91fc9ed335957665f7fed82700c63ceec",
            expected_token: "007YXBwLWlkLTEyMzRJQUJtTmVPbXlVZkQrSERNNlJIRkNnRDVIOG50TTFsWFpsOS83WUp3REdQTzdDb0E3NzZ0M2dDS2htY0ZBQUFBQVFDQTI0ZG5BZ0NBMjRkbkF3Q0EyNGRuQkFDQTI0ZG42QU9BMjRkbg==",
        },
    ]
}

/// Build an issuer pinned to a vector's time and salt.
pub fn issuer_for_vector(vector: &GoldenVector) -> TokenIssuer<FixedClock, FixedSalt> {
    TokenIssuer::with_sources(
        SigningCredentials::new(vector.app_id, vector.app_certificate),
        FixedClock::new(vector.issued_at),
        FixedSalt(vector.salt),
    )
    .with_policy(vector.policy)
}

/// Issue the token a vector describes.
pub fn token_from_vector(vector: &GoldenVector) -> livecast_token::Result<CapabilityToken> {
    issuer_for_vector(vector).issue(
        vector.channel,
        vector.subject,
        vector.role,
        vector.validity_secs,
    )
}

/// Check every vector. Returns `(name, matches, actual token or error)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match token_from_vector(v) {
            Ok(token) => {
                let matches = token.as_str() == v.expected_token
                    && token.signature().to_hex() == v.expected_signature
                    && hex::encode(token.message().encode()) == v.expected_message;
                (v.name.to_string(), matches, token.into_string())
            }
            Err(err) => (v.name.to_string(), false, err.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, actual) in verify_all_vectors() {
            assert!(matches, "vector '{name}' produced {actual}");
        }
    }

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in all_vectors() {
            let t1 = token_from_vector(&vector).unwrap();
            let t2 = token_from_vector(&vector).unwrap();
            assert_eq!(
                t1.as_str(),
                t2.as_str(),
                "vector '{}' produced different tokens on regeneration",
                vector.name
            );
        }
    }

    #[test]
    fn test_subject_zero_differs_only_in_signature() {
        let vectors = all_vectors();
        assert_eq!(vectors[0].expected_message, vectors[1].expected_message);
        assert_ne!(vectors[0].expected_signature, vectors[1].expected_signature);
    }
}
