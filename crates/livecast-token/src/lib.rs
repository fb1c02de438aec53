//! # Livecast Token
//!
//! Issuance of capability tokens for real-time channels.
//!
//! This crate contains no I/O and no shared state. A token is a pure function
//! of the signing credentials, the channel, the subject, the role, and two
//! injected inputs: the current time and a random salt.
//!
//! ## Key Types
//!
//! - [`TokenIssuer`] - Builds and signs tokens
//! - [`CapabilityToken`] - An issued token and its transmitted string form
//! - [`PrivilegeMessage`] - Salt, issue time and the privilege set
//! - [`DecodedToken`] - Structural view of a token string
//!
//! ## Wire Format
//!
//! ```text
//! token   = "007" || base64(app_id || base64(content))
//! content = u16 sig_len || signature || u16 msg_len || message
//! message = u32 salt || u32 issued_at || u32 count || count * (u16 kind || u32 expires_at)
//! ```
//!
//! All integers are little-endian. See [`wire`] for details.

pub mod credentials;
pub mod crypto;
pub mod error;
pub mod issuer;
pub mod privilege;
pub mod source;
pub mod wire;

pub use credentials::SigningCredentials;
pub use crypto::{compute_signature, subject_bytes, Signature};
pub use error::{Result, TokenError};
pub use issuer::{CapabilityToken, TokenIssuer, DEFAULT_VALIDITY_SECS};
pub use privilege::{
    Privilege, PrivilegeMessage, PrivilegePolicy, PrivilegeSet, Role, CANONICAL_ORDER,
};
pub use source::{Clock, FixedClock, FixedSalt, RandomSalt, SaltSource, SystemClock};
pub use wire::{DecodedToken, TOKEN_VERSION};
