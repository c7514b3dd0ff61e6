//! The external `note://` URL scheme.

use std::fmt;

use crate::crypto::ShareSecret;
use crate::errors::{NoteError, Result};

/// Expected length of a note identifier (128 bits as lowercase hex).
const NOTE_ID_LEN: usize = 32;

/// External identity of a note: `note://<note_id>#<share-secret>`.
///
/// The identifier is public routing information; the fragment is the only
/// copy of the decryption capability and is redacted from `Debug` output.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteUrl {
    note_id: String,
    secret: ShareSecret,
}

impl NoteUrl {
    /// Assemble a URL from freshly generated parts.
    ///
    /// Fails with [`NoteError::MalformedUrl`] unless `note_id` is 32
    /// lowercase hex characters, the same form [`NoteUrl::parse`] accepts;
    /// every constructed URL therefore renders back through `parse`.
    pub fn new(note_id: String, secret: ShareSecret) -> Result<Self> {
        check_note_id(&note_id)?;
        Ok(Self { note_id, secret })
    }

    /// Parse an externally supplied note URL.
    ///
    /// Fails with [`NoteError::MalformedUrl`] when the scheme prefix or the
    /// fragment separator is missing, when the identifier is not 32
    /// lowercase hex characters, or when the fragment does not decode to a
    /// share secret. Parsing is pure; nothing is looked up.
    pub fn parse(raw: &str) -> Result<Self> {
        let rest = raw
            .strip_prefix("note://")
            .ok_or_else(|| NoteError::malformed_url("URL must start with 'note://'"))?;

        let (note_id, fragment) = rest
            .split_once('#')
            .ok_or_else(|| NoteError::malformed_url("URL is missing the '#<secret>' fragment"))?;

        check_note_id(note_id)?;

        if fragment.is_empty() {
            return Err(NoteError::malformed_url("share secret fragment is empty"));
        }
        let secret = ShareSecret::from_urlsafe_b64(fragment)?;

        Ok(Self { note_id: note_id.to_string(), secret })
    }

    /// The public note identifier.
    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    /// The decryption capability carried in the fragment.
    pub fn secret(&self) -> &ShareSecret {
        &self.secret
    }
}

impl fmt::Display for NoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "note://{}#{}", self.note_id, self.secret.to_urlsafe_b64())
    }
}

// Canonical form check: decoding and re-encoding is only the identity on
// exact lowercase hex of the right length.
fn check_note_id(note_id: &str) -> Result<()> {
    let decoded =
        hex::decode(note_id).map_err(|_| NoteError::malformed_url("note id must be hex"))?;
    if decoded.len() != NOTE_ID_LEN / 2 || hex::encode(&decoded) != note_id {
        return Err(NoteError::malformed_url(format!(
            "note id must be {} lowercase hex characters",
            NOTE_ID_LEN
        )));
    }
    Ok(())
}
