//! Privileges and the signed privilege message.
//!
//! A token grants a set of privileges, each with its own absolute expiry.
//! The set is carried in the privilege message, which is also the last
//! component of the HMAC input.

use std::collections::BTreeMap;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenError};

/// A permitted action on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Privilege {
    /// Join the channel.
    JoinChannel = 1,
    /// Publish an audio stream.
    PublishAudioStream = 2,
    /// Publish a video stream.
    PublishVideoStream = 3,
    /// Publish a data stream.
    PublishDataStream = 4,
    /// Sign in to the messaging layer.
    SignIn = 1000,
}

/// Order in which privileges are written to the message.
pub const CANONICAL_ORDER: &[Privilege] = &[
    Privilege::JoinChannel,
    Privilege::PublishAudioStream,
    Privilege::PublishVideoStream,
    Privilege::PublishDataStream,
    Privilege::SignIn,
];

const SUBSCRIBER_SCOPED: &[Privilege] = &[Privilege::JoinChannel, Privilege::SignIn];

impl Privilege {
    /// Convert to u16 for serialization.
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Try to parse from u16.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::JoinChannel),
            2 => Some(Self::PublishAudioStream),
            3 => Some(Self::PublishVideoStream),
            4 => Some(Self::PublishDataStream),
            1000 => Some(Self::SignIn),
            _ => None,
        }
    }
}

/// The participation role a token is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sends media into the channel.
    Publisher,
    /// Receives media from the channel.
    Subscriber,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Publisher => "publisher",
            Role::Subscriber => "subscriber",
        }
    }
}

/// How the requested role maps to granted privileges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegePolicy {
    /// Every role receives all privileges.
    ///
    /// Tokens minted by existing deployments look like this, so it stays the
    /// default even though it lets subscribers publish.
    #[default]
    Uniform,
    /// Subscribers receive only `JoinChannel` and `SignIn`.
    RoleScoped,
}

impl PrivilegePolicy {
    /// Privileges granted to `role`, in canonical order.
    pub fn privileges_for(self, role: Role) -> &'static [Privilege] {
        match (self, role) {
            (PrivilegePolicy::RoleScoped, Role::Subscriber) => SUBSCRIBER_SCOPED,
            _ => CANONICAL_ORDER,
        }
    }
}

/// Ordered mapping from privilege kind to absolute expiry (seconds since epoch).
///
/// Keys are raw u16 kinds so that sets parsed from foreign tokens keep kinds
/// this crate does not know about. Iteration is ascending by kind, which is
/// the canonical wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeSet(BTreeMap<u16, u32>);

impl PrivilegeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Grant every privilege in `privileges` with the same expiry.
    pub fn uniform(privileges: &[Privilege], expires_at: u32) -> Self {
        let mut set = Self::new();
        for privilege in privileges {
            set.grant(*privilege, expires_at);
        }
        set
    }

    /// Grant a privilege, replacing any previous expiry.
    pub fn grant(&mut self, privilege: Privilege, expires_at: u32) {
        self.0.insert(privilege.to_u16(), expires_at);
    }

    /// Expiry of a privilege, if granted.
    pub fn expiry(&self, privilege: Privilege) -> Option<u32> {
        self.0.get(&privilege.to_u16()).copied()
    }

    /// Check if a privilege is granted.
    pub fn contains(&self, privilege: Privilege) -> bool {
        self.0.contains_key(&privilege.to_u16())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(kind, expires_at)` in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        self.0.iter().map(|(kind, expiry)| (*kind, *expiry))
    }
}

/// Byte size of the fixed message header (salt, issued_at, count).
const HEADER_LEN: usize = 12;

/// Byte size of one privilege entry (kind, expires_at).
const ENTRY_LEN: usize = 6;

/// The privilege message: the signed body of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeMessage {
    /// Random salt drawn per issuance.
    pub salt: u32,
    /// Issue time in seconds since epoch.
    pub issued_at: u32,
    /// Granted privileges.
    pub privileges: PrivilegeSet,
}

impl PrivilegeMessage {
    /// Encode to wire bytes.
    ///
    /// Format: `u32 salt | u32 issued_at | u32 count | count * (u16 kind | u32 expiry)`,
    /// all little-endian.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.privileges.len() * ENTRY_LEN);
        buf.put_u32_le(self.salt);
        buf.put_u32_le(self.issued_at);
        buf.put_u32_le(self.privileges.len() as u32);
        for (kind, expires_at) in self.privileges.iter() {
            buf.put_u16_le(kind);
            buf.put_u32_le(expires_at);
        }
        buf
    }

    /// Decode from wire bytes.
    ///
    /// Rejects truncated input, trailing bytes, and repeated kinds.
    pub fn decode(mut bytes: &[u8]) -> Result<Self> {
        if bytes.remaining() < HEADER_LEN {
            return Err(TokenError::Malformed(format!(
                "privilege message is {} bytes, header needs {HEADER_LEN}",
                bytes.len()
            )));
        }
        let salt = bytes.get_u32_le();
        let issued_at = bytes.get_u32_le();
        let count = bytes.get_u32_le() as usize;

        let expected = count
            .checked_mul(ENTRY_LEN)
            .ok_or_else(|| TokenError::Malformed("privilege count overflows".into()))?;
        if bytes.remaining() != expected {
            return Err(TokenError::Malformed(format!(
                "privilege count {count} needs {expected} bytes, found {}",
                bytes.remaining()
            )));
        }

        let mut privileges = PrivilegeSet::new();
        for _ in 0..count {
            let kind = bytes.get_u16_le();
            let expires_at = bytes.get_u32_le();
            if privileges.0.insert(kind, expires_at).is_some() {
                return Err(TokenError::Malformed(format!("duplicate privilege kind {kind}")));
            }
        }

        Ok(Self {
            salt,
            issued_at,
            privileges,
        })
    }
}
