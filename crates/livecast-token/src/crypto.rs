//! HMAC-SHA256 signing for capability tokens.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// A 32-byte HMAC-SHA256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 32]);

impl Signature {
    /// Byte length of a signature.
    pub const LEN: usize = 32;

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Signature {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Bytes that represent a subject id in the signature input.
///
/// Subject `0` means "assign on join" and contributes no bytes at all;
/// every other subject contributes its decimal ASCII digits.
pub fn subject_bytes(subject: u32) -> Vec<u8> {
    if subject == 0 {
        Vec::new()
    } else {
        subject.to_string().into_bytes()
    }
}

/// Compute the token signature.
///
/// Signed data: `app_id || channel || subject_bytes(subject) || message`,
/// keyed by the app certificate.
pub fn compute_signature(
    app_certificate: &str,
    app_id: &str,
    channel: &str,
    subject: u32,
    message: &[u8],
) -> Signature {
    let mut mac =
        HmacSha256::new_from_slice(app_certificate.as_bytes()).expect("HMAC can take key of any size");
    mac.update(app_id.as_bytes());
    mac.update(channel.as_bytes());
    mac.update(&subject_bytes(subject));
    mac.update(message);

    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Signature(out)
}
