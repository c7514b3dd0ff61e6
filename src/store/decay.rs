//! The atomic read-decay procedure shared by both store families.
//!
//! One Lua script implements "fetch the envelope, spend one read, delete on
//! exhaustion" as a single server-side step. The direct family runs it via
//! `EVAL`, the REST family via the bridge's `/eval` endpoint; both funnel
//! the reply through [`DecayReply`] so budget accounting and logging happen
//! in exactly one place.

use crate::errors::{NoteError, Result};

/// Server-side read-decay procedure.
///
/// Returns nil when the envelope is absent. Otherwise returns the pair
/// `{envelope, remaining}` where `remaining` is the budget left after this
/// read: `0` means this was the final read and both keys are gone, `-1`
/// means the counter was missing (a consistency violation; the note is
/// served anyway). A positive counter is rewritten with `KEEPTTL` so the
/// budget never outlives the envelope's expiry.
pub const READ_DECAY_SCRIPT: &str = r#"
local note = redis.call('GET', KEYS[1])
if not note then
  return nil
end
local reads = redis.call('GET', KEYS[2])
if not reads then
  return {note, -1}
end
local remaining = tonumber(reads) - 1
if remaining <= 0 then
  redis.call('DEL', KEYS[1], KEYS[2])
  return {note, 0}
end
redis.call('SET', KEYS[2], tostring(remaining), 'KEEPTTL')
return {note, remaining}
"#;

/// Decoded outcome of one read-decay execution.
#[derive(Debug, Clone, PartialEq)]
pub enum DecayReply {
    /// Envelope absent: expired, exhausted, or never created.
    Missing,
    /// Envelope present, with the post-decrement read budget.
    Read { envelope: String, remaining: i64 },
}

impl DecayReply {
    /// Build a reply from the direct protocol's typed response.
    pub fn from_pair(pair: Option<(String, i64)>) -> Self {
        match pair {
            None => Self::Missing,
            Some((envelope, remaining)) => Self::Read { envelope, remaining },
        }
    }

    /// Build a reply from the REST bridge's `result` payload.
    ///
    /// The bridge encodes nil as JSON `null` and the Lua pair as a two
    /// element array. Any other shape means the bridge is misbehaving.
    pub fn from_rest_result(store: &str, result: &serde_json::Value) -> Result<Self> {
        if result.is_null() {
            return Ok(Self::Missing);
        }

        let parts = result
            .as_array()
            .filter(|parts| parts.len() == 2)
            .ok_or_else(|| unexpected_reply(store, result))?;
        let envelope = parts[0].as_str().ok_or_else(|| unexpected_reply(store, result))?;
        let remaining = parts[1].as_i64().ok_or_else(|| unexpected_reply(store, result))?;

        Ok(Self::Read { envelope: envelope.to_string(), remaining })
    }

    /// Convert the reply into the trait-level outcome, logging the budget.
    pub fn settle(self, store: &str, envelope_key: &str) -> Option<String> {
        match self {
            Self::Missing => {
                tracing::debug!(store = %store, key = %envelope_key, "note absent");
                None
            }
            Self::Read { envelope, remaining } => {
                if remaining < 0 {
                    tracing::warn!(
                        store = %store,
                        key = %envelope_key,
                        "note has no read counter; serving without decay"
                    );
                } else {
                    tracing::debug!(
                        store = %store,
                        key = %envelope_key,
                        remaining,
                        "note read accepted"
                    );
                }
                Some(envelope)
            }
        }
    }
}

fn unexpected_reply(store: &str, result: &serde_json::Value) -> NoteError {
    NoteError::backend_unavailable(store, format!("unexpected eval reply shape: {}", result))
}
