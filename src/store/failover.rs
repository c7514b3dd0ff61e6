//! Ordered failover across backing stores.
//!
//! Creation tries stores in configured order and commits to the first one
//! that accepts the full envelope/counter pair. Reads never fail over:
//! stores are independent and hold different notes, so once a read store is
//! selected a miss there is final. This module owns both policies.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{NoteError, Result};
use crate::store::NoteStore;

/// Write the envelope/counter pair to the first store that accepts both.
///
/// A store that accepts the envelope but rejects the counter gets a
/// best-effort compensation delete before the next store is tried, so no
/// store is left holding an envelope without its read budget. When every
/// store fails the per-store causes are reported together and no partial
/// state remains anywhere.
///
/// Returns the location of the winning store.
pub async fn persist_note(
    stores: &[Arc<dyn NoteStore>],
    envelope_key: &str,
    envelope_json: &str,
    counter_key: &str,
    max_reads: u32,
    ttl_seconds: u64,
) -> Result<String> {
    let mut causes = Vec::new();

    for store in stores {
        if let Err(err) = store.set_with_expiry(envelope_key, envelope_json, ttl_seconds).await {
            warn!(
                store = %store.location(),
                error = %err,
                "envelope write failed, trying next store"
            );
            causes.push((store.location().to_string(), cause_of(&err)));
            continue;
        }

        match store.set_with_expiry(counter_key, &max_reads.to_string(), ttl_seconds).await {
            Ok(()) => {
                debug!(store = %store.location(), key = %envelope_key, "note persisted");
                return Ok(store.location().to_string());
            }
            Err(err) => {
                warn!(
                    store = %store.location(),
                    error = %err,
                    "counter write failed, trying next store"
                );
                if let Err(cleanup) = store.delete(envelope_key).await {
                    warn!(
                        store = %store.location(),
                        error = %cleanup,
                        "failed to clean up orphaned envelope"
                    );
                }
                causes.push((store.location().to_string(), cause_of(&err)));
            }
        }
    }

    Err(NoteError::AllBackendsUnavailable { causes })
}

/// Fix the store that will serve a read by probing in configured order.
///
/// The first store answering its health probe wins. The caller never
/// retargets afterwards: a reachable store that does not hold the note is
/// the end of the road.
pub async fn select_live_store(stores: &[Arc<dyn NoteStore>]) -> Result<Arc<dyn NoteStore>> {
    let mut causes = Vec::new();

    for store in stores {
        if store.health_check().await {
            debug!(store = %store.location(), "selected read store");
            return Ok(Arc::clone(store));
        }
        warn!(store = %store.location(), "store failed health probe");
        causes.push((store.location().to_string(), "health probe failed".to_string()));
    }

    Err(NoteError::AllBackendsUnavailable { causes })
}

fn cause_of(err: &NoteError) -> String {
    match err {
        NoteError::BackendUnavailable { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
