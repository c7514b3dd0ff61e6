//! Envelope encryption for note payloads.
//!
//! A note is sealed under a key derived from the out-of-band share secret
//! and a per-note salt; the salt travels inside the stored envelope, the
//! secret only ever inside the note URL fragment. Stores see ciphertext
//! and derivation salt, never key material.

mod envelope;
mod secret;

pub use envelope::{derive_key, Envelope, NONCE_LEN, SALT_LEN};
pub use secret::{ShareSecret, SECRET_LEN};
