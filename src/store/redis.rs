//! Direct-protocol store adapter for Redis-compatible servers.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{NoteError, Result};
use crate::store::decay::DecayReply;
use crate::store::{NoteStore, READ_DECAY_SCRIPT};

/// Store adapter speaking the wire protocol directly.
///
/// Works against anything Redis-compatible (Redis, Dragonfly, Valkey). The
/// underlying client is synchronous; each operation runs on the blocking
/// pool with connect and socket timeouts so a dead store cannot stall the
/// caller beyond the configured bound.
#[derive(Debug)]
pub struct RedisStore {
    client: redis::Client,
    location: String,
    timeout: Duration,
}

impl RedisStore {
    /// Build an adapter for `url`. Validates the URL shape only; the first
    /// connection is established lazily by the first operation.
    pub fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let location = sanitize_location(url);
        let client = redis::Client::open(url)
            .map_err(|e| NoteError::config(format!("invalid store URL '{}': {}", location, e)))?;

        Ok(Self { client, location, timeout })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut redis::Connection) -> redis::RedisResult<T> + Send + 'static,
    {
        let client = self.client.clone();
        let timeout = self.timeout;
        let location = self.location.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = client
                .get_connection_with_timeout(timeout)
                .map_err(|e| NoteError::backend_unavailable(&location, e.to_string()))?;
            conn.set_read_timeout(Some(timeout))
                .map_err(|e| NoteError::backend_unavailable(&location, e.to_string()))?;
            conn.set_write_timeout(Some(timeout))
                .map_err(|e| NoteError::backend_unavailable(&location, e.to_string()))?;
            f(&mut conn).map_err(|e| NoteError::backend_unavailable(&location, e.to_string()))
        })
        .await
        .map_err(|e| NoteError::internal(format!("store task failed: {}", e)))?
    }
}

#[async_trait]
impl NoteStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        debug!(store = %self.location, %key, "GET");
        let key = key.to_string();
        self.with_conn(move |c| redis::cmd("GET").arg(&key).query(c)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(store = %self.location, %key, "SET");
        let (key, value) = (key.to_string(), value.to_string());
        self.with_conn(move |c| redis::cmd("SET").arg(&key).arg(&value).query(c)).await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        debug!(store = %self.location, %key, ttl_seconds, "SET EX");
        let (key, value) = (key.to_string(), value.to_string());
        self.with_conn(move |c| {
            redis::cmd("SET").arg(&key).arg(&value).arg("EX").arg(ttl_seconds).query(c)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        debug!(store = %self.location, %key, "DEL");
        let key = key.to_string();
        self.with_conn(move |c| redis::cmd("DEL").arg(&key).query(c)).await
    }

    async fn read_decay(&self, envelope_key: &str, counter_key: &str) -> Result<Option<String>> {
        debug!(store = %self.location, key = %envelope_key, "EVAL read-decay");
        let (ek, ck) = (envelope_key.to_string(), counter_key.to_string());
        let pair: Option<(String, i64)> = self
            .with_conn(move |c| {
                redis::cmd("EVAL").arg(READ_DECAY_SCRIPT).arg(2).arg(&ek).arg(&ck).query(c)
            })
            .await?;

        Ok(DecayReply::from_pair(pair).settle(&self.location, envelope_key))
    }

    async fn health_check(&self) -> bool {
        self.with_conn(|c| redis::cmd("PING").query::<String>(c)).await.is_ok()
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// Strip credentials from a store URL so it is safe for logs and errors.
fn sanitize_location(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(None);
            }
            parsed.to_string()
        }
        Err(_) => raw.to_string(),
    }
}
