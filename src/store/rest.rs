//! Store adapter for a token-authenticated Redis REST bridge.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::RestConfig;
use crate::errors::{NoteError, Result};
use crate::store::decay::DecayReply;
use crate::store::{NoteStore, READ_DECAY_SCRIPT};

/// HTTP adapter for an Upstash-style Redis REST bridge.
///
/// Single-command endpoints (`/get/{key}`, `/set/{key}`, `/del/{key}`,
/// `/ping`) plus `/eval` for the read-decay script. Every response is a
/// JSON object `{"result": ...}` and every request carries the bearer
/// token. The token never appears in `location()`, logs, or errors.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    token: String,
}

impl RestStore {
    /// Build an adapter from the bridge descriptor.
    pub fn new(config: &RestConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NoteError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Send one request and unwrap the bridge's `{"result": ...}` envelope.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| NoteError::backend_unavailable(&self.base_url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NoteError::backend_unavailable(
                &self.base_url,
                format!("bridge returned HTTP {}", status),
            ));
        }

        let reply: BridgeReply = response.json().await.map_err(|e| {
            NoteError::backend_unavailable(
                &self.base_url,
                format!("undecodable bridge reply: {}", e),
            )
        })?;

        Ok(reply.result)
    }
}

#[async_trait]
impl NoteStore for RestStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let url = format!("{}/get/{}", self.base_url, key);
        debug!("GET {}", url);

        match self.execute(self.client.get(&url)).await? {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::String(value) => Ok(Some(value)),
            other => Err(NoteError::backend_unavailable(
                &self.base_url,
                format!("unexpected get reply: {}", other),
            )),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let url = format!("{}/set/{}", self.base_url, key);
        debug!("POST {}", url);

        self.execute(self.client.post(&url).body(value.to_string())).await?;
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let url = format!("{}/set/{}?ex={}", self.base_url, key, ttl_seconds);
        debug!("POST {}", url);

        self.execute(self.client.post(&url).body(value.to_string())).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let url = format!("{}/del/{}", self.base_url, key);
        debug!("POST {}", url);

        self.execute(self.client.post(&url)).await?;
        Ok(())
    }

    async fn read_decay(&self, envelope_key: &str, counter_key: &str) -> Result<Option<String>> {
        let url = format!("{}/eval", self.base_url);
        debug!("POST {}", url);

        let body = json!({
            "script": READ_DECAY_SCRIPT,
            "keys": [envelope_key, counter_key],
            "args": [],
        });
        let result = self.execute(self.client.post(&url).json(&body)).await?;
        let reply = DecayReply::from_rest_result(&self.base_url, &result)?;

        Ok(reply.settle(&self.base_url, envelope_key))
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/ping", self.base_url);
        self.execute(self.client.get(&url)).await.is_ok()
    }

    fn location(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for RestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    result: serde_json::Value,
}
