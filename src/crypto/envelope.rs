//! Sealing and opening of encrypted note envelopes.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha384;

use crate::crypto::ShareSecret;
use crate::errors::{NoteError, Result};

/// Key derivation context label. Fixed: changing it orphans every stored note.
const KEY_INFO: &[u8] = b"secure-note";

/// AEAD nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Key derivation salt length in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Derive the AES-256 key for one envelope.
///
/// HKDF-SHA-384 over the share secret, salted per note. Deterministic in
/// `(secret, salt)`; distinct salts yield independent keys even if two notes
/// were ever created with the same secret.
pub fn derive_key(secret: &ShareSecret, salt: &[u8]) -> Result<[u8; 32]> {
    let hkdf = Hkdf::<Sha384>::new(Some(salt), secret.expose_secret());
    let mut okm = [0u8; 32];
    hkdf.expand(KEY_INFO, &mut okm)
        .map_err(|_| NoteError::internal("failed to derive key material"))?;
    Ok(okm)
}

/// Encrypted, authenticated note payload as persisted in a store.
///
/// Wire form is JSON with standard-base64 fields:
/// `{"nonce": .., "ciphertext": .., "salt": ..}`. The envelope alone is
/// useless; decryption requires the share secret from the note URL fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Fresh 96-bit value per encryption, never reused for the same key
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,

    /// AEAD output: plaintext length plus the 128-bit tag
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,

    /// Key derivation salt, stored in the clear
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
}

impl Envelope {
    /// Encrypt `plaintext` under a fresh salt and nonce.
    pub fn seal(plaintext: &str, secret: &ShareSecret) -> Result<Self> {
        let mut salt = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = vec![0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let key = derive_key(secret, &salt)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| NoteError::internal("invalid AES key length"))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| NoteError::internal("failed to encrypt payload"))?;

        Ok(Self { nonce, ciphertext, salt })
    }

    /// Decrypt the envelope with the supplied share secret.
    ///
    /// Returns [`NoteError::Authentication`] when the tag does not verify:
    /// wrong secret, corrupted ciphertext, and tampering are deliberately
    /// indistinguishable.
    pub fn open(&self, secret: &ShareSecret) -> Result<String> {
        self.check_lengths()?;

        let key = derive_key(secret, &self.salt)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| NoteError::internal("invalid AES key length"))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_ref())
            .map_err(|_| NoteError::Authentication)?;

        String::from_utf8(plaintext)
            .map_err(|_| NoteError::malformed_envelope("plaintext is not valid UTF-8"))
    }

    /// Serialize to the canonical JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| NoteError::internal(format!("envelope encode failed: {}", e)))
    }

    /// Parse the canonical JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self> {
        let envelope: Self =
            serde_json::from_str(raw).map_err(|e| NoteError::malformed_envelope(e.to_string()))?;
        envelope.check_lengths()?;
        Ok(envelope)
    }

    fn check_lengths(&self) -> Result<()> {
        if self.nonce.len() != NONCE_LEN {
            return Err(NoteError::malformed_envelope(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LEN,
                self.nonce.len()
            )));
        }
        if self.salt.len() != SALT_LEN {
            return Err(NoteError::malformed_envelope(format!(
                "salt must be {} bytes, got {}",
                SALT_LEN,
                self.salt.len()
            )));
        }
        Ok(())
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        STANDARD.decode(raw).map_err(serde::de::Error::custom)
    }
}
