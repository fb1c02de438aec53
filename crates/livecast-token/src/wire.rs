//! Token string encoding.
//!
//! ```text
//! token   = "007" || base64(app_id || base64(content))
//! content = u16 sig_len || signature || u16 msg_len || message
//! ```
//!
//! Length prefixes are little-endian u16. base64 is the standard padded
//! alphabet at both layers. The app id has no length prefix: a reader must
//! already know it, which is why [`DecodedToken::parse`] takes it as input.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::{Buf, BufMut};

use crate::crypto::Signature;
use crate::error::{Result, TokenError};
use crate::privilege::PrivilegeMessage;

/// Version tag prefixed to every token.
pub const TOKEN_VERSION: &str = "007";

/// Pack signature and message into length-prefixed content bytes.
pub fn pack_content(signature: &Signature, message: &[u8]) -> Result<Vec<u8>> {
    let msg_len = u16::try_from(message.len()).map_err(|_| {
        TokenError::Malformed(format!("message of {} bytes exceeds u16 prefix", message.len()))
    })?;

    let mut buf = Vec::with_capacity(4 + Signature::LEN + message.len());
    buf.put_u16_le(Signature::LEN as u16);
    buf.put_slice(signature.as_bytes());
    buf.put_u16_le(msg_len);
    buf.put_slice(message);
    Ok(buf)
}

/// Split content bytes into signature and message bytes.
pub fn unpack_content(mut content: &[u8]) -> Result<(Signature, Vec<u8>)> {
    let sig = take_prefixed(&mut content, "signature")?;
    if sig.len() != Signature::LEN {
        return Err(TokenError::Malformed(format!(
            "signature is {} bytes, expected {}",
            sig.len(),
            Signature::LEN
        )));
    }
    let message = take_prefixed(&mut content, "message")?;
    if content.has_remaining() {
        return Err(TokenError::Malformed(format!(
            "{} trailing bytes after message",
            content.remaining()
        )));
    }

    let mut arr = [0u8; 32];
    arr.copy_from_slice(sig);
    Ok((Signature(arr), message.to_vec()))
}

fn take_prefixed<'a>(buf: &mut &'a [u8], field: &str) -> Result<&'a [u8]> {
    if buf.remaining() < 2 {
        return Err(TokenError::Malformed(format!("missing {field} length")));
    }
    let len = buf.get_u16_le() as usize;
    if buf.remaining() < len {
        return Err(TokenError::Malformed(format!(
            "{field} needs {len} bytes, found {}",
            buf.remaining()
        )));
    }
    let rest: &'a [u8] = *buf;
    let (head, tail) = rest.split_at(len);
    *buf = tail;
    Ok(head)
}

/// Assemble the transmitted token string.
pub fn encode_token(app_id: &str, signature: &Signature, message: &[u8]) -> Result<String> {
    let content = STANDARD.encode(pack_content(signature, message)?);

    let mut outer = Vec::with_capacity(app_id.len() + content.len());
    outer.extend_from_slice(app_id.as_bytes());
    outer.extend_from_slice(content.as_bytes());

    Ok(format!("{TOKEN_VERSION}{}", STANDARD.encode(outer)))
}

/// Structural view of a token string.
///
/// Parsing checks shape only. It does not recompute the signature or look
/// at expiry times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Version tag.
    pub version: String,
    /// Application identity.
    pub app_id: String,
    /// Embedded signature.
    pub signature: Signature,
    /// Raw privilege message, exactly as signed.
    pub message_bytes: Vec<u8>,
    /// Decoded privilege message.
    pub message: PrivilegeMessage,
}

impl DecodedToken {
    /// Parse a token issued under `app_id`.
    pub fn parse(token: &str, app_id: &str) -> Result<Self> {
        let body = token.strip_prefix(TOKEN_VERSION).ok_or_else(|| {
            TokenError::Malformed(format!(
                "expected version {TOKEN_VERSION}, got {:?}",
                token.get(..TOKEN_VERSION.len()).unwrap_or(token)
            ))
        })?;

        let outer = STANDARD
            .decode(body)
            .map_err(|e| TokenError::Malformed(format!("outer base64: {e}")))?;

        let content_b64 = outer
            .strip_prefix(app_id.as_bytes())
            .ok_or_else(|| TokenError::Malformed("app id does not match".into()))?;

        let content = STANDARD
            .decode(content_b64)
            .map_err(|e| TokenError::Malformed(format!("content base64: {e}")))?;

        let (signature, message_bytes) = unpack_content(&content)?;
        let message = PrivilegeMessage::decode(&message_bytes)?;

        Ok(Self {
            version: TOKEN_VERSION.to_string(),
            app_id: app_id.to_string(),
            signature,
            message_bytes,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privilege::{PrivilegeSet, CANONICAL_ORDER};

    fn sample_message() -> Vec<u8> {
        PrivilegeMessage {
            salt: 1,
            issued_at: 1_000,
            privileges: PrivilegeSet::uniform(CANONICAL_ORDER, 2_000),
        }
        .encode()
    }

    #[test]
    fn test_content_layout() {
        let sig = Signature([0xAB; 32]);
        let message = sample_message();
        let content = pack_content(&sig, &message).unwrap();

        assert_eq!(&content[..2], &[32, 0]);
        assert_eq!(&content[2..34], &[0xAB; 32]);
        assert_eq!(&content[34..36], &[42, 0]);
        assert_eq!(&content[36..], &message[..]);

        let (sig2, msg2) = unpack_content(&content).unwrap();
        assert_eq!(sig2, sig);
        assert_eq!(msg2, message);
    }

    #[test]
    fn test_token_nesting() {
        let sig = Signature([0x01; 32]);
        let message = sample_message();
        let token = encode_token("app", &sig, &message).unwrap();

        assert!(token.starts_with("007"));
        let outer = STANDARD.decode(&token[3..]).unwrap();
        assert_eq!(&outer[..3], b"app");

        let inner = STANDARD.decode(&outer[3..]).unwrap();
        assert_eq!(inner, pack_content(&sig, &message).unwrap());
    }

    #[test]
    fn test_parse_recovers_parts() {
        let sig = Signature([0x5A; 32]);
        let message = sample_message();
        let token = encode_token("my-app", &sig, &message).unwrap();

        let decoded = DecodedToken::parse(&token, "my-app").unwrap();
        assert_eq!(decoded.version, "007");
        assert_eq!(decoded.signature, sig);
        assert_eq!(decoded.message_bytes, message);
        assert_eq!(decoded.message.issued_at, 1_000);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        let token = encode_token("app", &Signature([0; 32]), &sample_message()).unwrap();

        assert!(DecodedToken::parse(&token.replacen("007", "006", 1), "app").is_err());
        assert!(DecodedToken::parse(&token, "other").is_err());
        assert!(DecodedToken::parse("007!!!", "app").is_err());
        assert!(DecodedToken::parse("", "app").is_err());

        // Short signature length prefix.
        let mut content = Vec::new();
        content.put_u16_le(4);
        content.put_slice(&[0; 4]);
        content.put_u16_le(0);
        assert!(unpack_content(&content).is_err());

        // Trailing garbage after the message.
        let mut content = pack_content(&Signature([0; 32]), &sample_message()).unwrap();
        content.push(0xFF);
        assert!(unpack_content(&content).is_err());
    }
}
