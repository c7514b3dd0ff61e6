//! Error types for note lifecycle and store operations.

use thiserror::Error;

/// Result type for note operations.
pub type Result<T> = std::result::Result<T, NoteError>;

/// Errors that can occur while creating, storing, or opening notes.
#[derive(Error, Debug)]
pub enum NoteError {
    /// A single backing store could not be reached or refused the request.
    #[error("Store '{store}' unavailable: {reason}")]
    BackendUnavailable { store: String, reason: String },

    /// Every configured store in the selected family failed.
    #[error("All backing stores unavailable: {}", summarize_causes(.causes))]
    AllBackendsUnavailable { causes: Vec<(String, String)> },

    /// Ciphertext failed authentication during decryption.
    ///
    /// Covers a wrong share secret as well as corrupted or tampered
    /// ciphertext; the cases are not distinguishable and the message
    /// carries no key material.
    #[error("Decryption failed: ciphertext did not authenticate")]
    Authentication,

    /// A note URL could not be parsed.
    #[error("Malformed note URL: {reason}")]
    MalformedUrl { reason: String },

    /// A stored envelope could not be decoded.
    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    /// The note does not exist on the selected store.
    ///
    /// Expired, exhausted, and never-created notes are deliberately
    /// indistinguishable.
    #[error("Note not available: it may have expired or been read already")]
    NotAvailable,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Generic internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn summarize_causes(causes: &[(String, String)]) -> String {
    causes
        .iter()
        .map(|(store, reason)| format!("{}: {}", store, reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl NoteError {
    /// Create a backend unavailable error.
    pub fn backend_unavailable(store: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable { store: store.into(), reason: reason.into() }
    }

    /// Create a malformed URL error.
    pub fn malformed_url(reason: impl Into<String>) -> Self {
        Self::MalformedUrl { reason: reason.into() }
    }

    /// Create a malformed envelope error.
    pub fn malformed_envelope(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope { reason: reason.into() }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether retrying the operation against another store could succeed.
    ///
    /// Only transport-level failures are transient; crypto and data errors
    /// are terminal no matter which store serves them.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = NoteError::backend_unavailable("redis://127.0.0.1:6379", "connection refused");
        assert!(matches!(err, NoteError::BackendUnavailable { .. }));
        assert_eq!(
            err.to_string(),
            "Store 'redis://127.0.0.1:6379' unavailable: connection refused"
        );

        let err = NoteError::malformed_url("missing fragment");
        assert!(matches!(err, NoteError::MalformedUrl { .. }));

        let err = NoteError::config("no store URLs configured");
        assert!(matches!(err, NoteError::Config { .. }));
    }

    #[test]
    fn test_all_backends_display_lists_causes() {
        let err = NoteError::AllBackendsUnavailable {
            causes: vec![
                ("redis://a:6379".into(), "timed out".into()),
                ("redis://b:6379".into(), "connection refused".into()),
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("redis://a:6379: timed out"));
        assert!(rendered.contains("redis://b:6379: connection refused"));
    }

    #[test]
    fn test_transience() {
        assert!(NoteError::backend_unavailable("s", "down").is_transient());
        assert!(!NoteError::Authentication.is_transient());
        assert!(!NoteError::NotAvailable.is_transient());
        assert!(!NoteError::malformed_url("no scheme").is_transient());
    }

    #[test]
    fn test_authentication_display_carries_no_material() {
        let rendered = NoteError::Authentication.to_string();
        assert!(!rendered.contains("key"));
        assert!(rendered.contains("authenticate"));
    }
}
