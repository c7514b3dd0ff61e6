//! In-memory `NoteStore` fakes.
//!
//! `MemoryStore` mirrors the semantics of a real expiring key-value store
//! against a manually advanced clock, including the atomic read-decay
//! contract. `FailingStore` refuses every operation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sealnote::errors::{NoteError, Result};
use sealnote::store::NoteStore;

#[derive(Clone)]
struct Entry {
    value: String,
    expires_at_ms: Option<u64>,
}

/// An expiring key-value store held in process memory.
///
/// Time only moves when a test calls [`MemoryStore::advance`]. Marking the
/// store unhealthy makes every operation fail the way an unreachable
/// backend would.
pub struct MemoryStore {
    location: String,
    state: Mutex<HashMap<String, Entry>>,
    clock_ms: AtomicU64,
    healthy: AtomicBool,
    reject_counter_writes: AtomicBool,
    delete_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            state: Mutex::new(HashMap::new()),
            clock_ms: AtomicU64::new(0),
            healthy: AtomicBool::new(true),
            reject_counter_writes: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// Move the fake clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Make writes to `:reads` counter keys fail while everything else
    /// keeps working, so half-written notes can be staged.
    pub fn reject_counter_writes(&self, reject: bool) {
        self.reject_counter_writes.store(reject, Ordering::SeqCst);
    }

    /// Current live value under `key`, expiry applied.
    pub fn value(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        self.gc(&mut state);
        state.get(key).map(|entry| entry.value.clone())
    }

    pub fn is_empty(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        self.gc(&mut state);
        state.is_empty()
    }

    /// How many times `delete` has been called.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn now_ms(&self) -> u64 {
        self.clock_ms.load(Ordering::SeqCst)
    }

    fn gc(&self, state: &mut HashMap<String, Entry>) {
        let now = self.now_ms();
        state.retain(|_, entry| match entry.expires_at_ms {
            Some(deadline) => deadline > now,
            None => true,
        });
    }

    fn check_reachable(&self) -> Result<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(NoteError::backend_unavailable(&self.location, "connection refused"))
        }
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_reachable()?;
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_reachable()?;
        let mut state = self.state.lock().unwrap();
        state.insert(key.to_string(), Entry { value: value.to_string(), expires_at_ms: None });
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        self.check_reachable()?;
        if self.reject_counter_writes.load(Ordering::SeqCst) && key.ends_with(":reads") {
            return Err(NoteError::backend_unavailable(&self.location, "write rejected"));
        }
        let mut state = self.state.lock().unwrap();
        let expires_at_ms = Some(self.now_ms() + ttl_seconds * 1000);
        state.insert(key.to_string(), Entry { value: value.to_string(), expires_at_ms });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_reachable()?;
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state.remove(key);
        Ok(())
    }

    async fn read_decay(&self, envelope_key: &str, counter_key: &str) -> Result<Option<String>> {
        self.check_reachable()?;

        // One lock for the whole sequence, matching the script's atomicity.
        let mut state = self.state.lock().unwrap();
        self.gc(&mut state);

        let envelope = match state.get(envelope_key) {
            Some(entry) => entry.value.clone(),
            None => return Ok(None),
        };

        match state.get(counter_key).cloned() {
            None => Ok(Some(envelope)),
            Some(counter) => {
                let remaining = counter.value.parse::<i64>().unwrap_or(0) - 1;
                if remaining <= 0 {
                    state.remove(envelope_key);
                    state.remove(counter_key);
                } else {
                    // Rewrite preserving the original deadline, as KEEPTTL does.
                    state.insert(
                        counter_key.to_string(),
                        Entry {
                            value: remaining.to_string(),
                            expires_at_ms: counter.expires_at_ms,
                        },
                    );
                }
                Ok(Some(envelope))
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// A store that refuses every operation.
pub struct FailingStore {
    location: String,
}

impl FailingStore {
    pub fn new(location: &str) -> Self {
        Self { location: location.to_string() }
    }

    fn refuse<T>(&self) -> Result<T> {
        Err(NoteError::backend_unavailable(&self.location, "injected failure"))
    }
}

#[async_trait]
impl NoteStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        self.refuse()
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        self.refuse()
    }

    async fn set_with_expiry(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> Result<()> {
        self.refuse()
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        self.refuse()
    }

    async fn read_decay(&self, _envelope_key: &str, _counter_key: &str) -> Result<Option<String>> {
        self.refuse()
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn location(&self) -> &str {
        &self.location
    }
}
