//! Backing stores for sealed notes.
//!
//! Two adapter families implement one capability trait: a direct-protocol
//! client for Redis-compatible servers and an HTTP client for a
//! token-authenticated REST bridge. The lifecycle layer treats both
//! uniformly; which family serves a note is decided once, at service
//! construction, and never mixed afterwards.

mod decay;
mod failover;
mod redis;
mod rest;

pub use self::decay::{DecayReply, READ_DECAY_SCRIPT};
pub use self::failover::{persist_note, select_live_store};
pub use self::redis::RedisStore;
pub use self::rest::RestStore;

use async_trait::async_trait;

use crate::errors::Result;

/// Trait for note storage backends.
///
/// Implementations are pure transport: they move opaque strings in and out
/// of a store and execute the atomic read-decay procedure server-side. They
/// never interpret envelope contents and MUST NOT log stored values.
///
/// Every operation maps transport failures (unreachable store, timeout,
/// refused auth) to [`NoteError::BackendUnavailable`] so callers can
/// distinguish "store down" from "note absent".
///
/// [`NoteError::BackendUnavailable`]: crate::errors::NoteError::BackendUnavailable
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Retrieve a value by key. `None` means the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value without expiry, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Store a value that the backend drops after `ttl_seconds`.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically fetch the envelope under `envelope_key` and decrement the
    /// read budget under `counter_key`, deleting both once the budget is
    /// spent.
    ///
    /// Returns `None` when the envelope is absent (expired, exhausted, or
    /// never created; the store cannot tell and neither can the caller).
    /// The fetch, decrement, and conditional delete execute as one
    /// server-side step, so concurrent readers racing on the final read
    /// cannot both receive the envelope.
    async fn read_decay(&self, envelope_key: &str, counter_key: &str) -> Result<Option<String>>;

    /// Lightweight reachability probe. Never used inside the write path.
    async fn health_check(&self) -> bool;

    /// Display label for logs and error causes. Carries no credentials.
    fn location(&self) -> &str;
}

impl std::fmt::Debug for dyn NoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteStore").field("location", &self.location()).finish()
    }
}
