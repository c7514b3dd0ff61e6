//! Note lifecycle: identity, creation, and read-decay consumption.
//!
//! # Architecture
//!
//! - [`NoteUrl`]: the `note://<id>#<secret>` scheme, parsing and rendering
//! - [`NoteService`]: orchestrates encrypt-then-store and probe-then-read
//! - [`StoreFamily`]: fixes a service to direct stores or the HTTP bridge
//!
//! The service composes the crypto and store layers and owns the mapping
//! from note identifiers to storage keys. Everything below it is
//! content-agnostic; everything above it never sees an envelope.

mod service;
mod url;

// Re-export main types
pub use service::{counter_key, envelope_key, NoteService, StoreFamily};
pub use url::NoteUrl;
