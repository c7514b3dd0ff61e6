//! Secure wrapper for the note share secret.
//!
//! The share secret is the only decryption capability for a note. It is
//! generated client-side, travels exclusively in the URL fragment, and is
//! never persisted, so the wrapper refuses to expose it through Debug or
//! serialization and zeroes its memory on drop.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{NoteError, Result};

/// Share secret length in bytes (256 bits).
pub const SECRET_LEN: usize = 32;

/// A note's share secret.
///
/// Debug output shows `ShareSecret([REDACTED])`; the raw bytes are only
/// reachable through [`ShareSecret::expose_secret`]. Memory is zeroed when
/// the value is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ShareSecret([u8; SECRET_LEN]);

impl ShareSecret {
    /// Generate a fresh share secret from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wrap existing secret bytes.
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a secret from its URL-fragment form (padded URL-safe base64).
    pub fn from_urlsafe_b64(encoded: &str) -> Result<Self> {
        let decoded = URL_SAFE
            .decode(encoded)
            .map_err(|_| NoteError::malformed_url("share secret is not valid base64"))?;

        let bytes: [u8; SECRET_LEN] = decoded.try_into().map_err(|_| {
            NoteError::malformed_url(format!("share secret must decode to {} bytes", SECRET_LEN))
        })?;

        Ok(Self(bytes))
    }

    /// Encode the secret for embedding in a note URL fragment.
    pub fn to_urlsafe_b64(&self) -> String {
        URL_SAFE.encode(self.0)
    }

    /// Exposes the underlying secret bytes.
    ///
    /// Only for key derivation; never log or print the result.
    pub fn expose_secret(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }
}

impl fmt::Debug for ShareSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShareSecret([REDACTED])")
    }
}

impl PartialEq for ShareSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ShareSecret {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_secret_redacts_debug() {
        let secret = ShareSecret::from_bytes([0xAB; SECRET_LEN]);
        let debug_output = format!("{:?}", secret);

        assert_eq!(debug_output, "ShareSecret([REDACTED])");
        assert!(!debug_output.contains("AB"));
    }

    #[test]
    fn test_urlsafe_round_trip() {
        let secret = ShareSecret::generate();
        let encoded = secret.to_urlsafe_b64();

        // Padded URL-safe alphabet only.
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')));

        let decoded = ShareSecret::from_urlsafe_b64(&encoded).unwrap();
        assert_eq!(secret, decoded);
    }

    #[test]
    fn test_rejects_bad_encoding() {
        let err = ShareSecret::from_urlsafe_b64("not!!valid@@base64").unwrap_err();
        assert!(matches!(err, NoteError::MalformedUrl { .. }));
    }

    #[test]
    fn test_rejects_wrong_length() {
        let short = URL_SAFE.encode([0u8; 16]);
        let err = ShareSecret::from_urlsafe_b64(&short).unwrap_err();
        assert!(matches!(err, NoteError::MalformedUrl { .. }));
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn test_generate_is_unique() {
        let a = ShareSecret::generate();
        let b = ShareSecret::generate();
        assert_ne!(a, b);
    }
}
