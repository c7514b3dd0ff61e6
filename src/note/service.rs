//! Note lifecycle orchestration over the configured stores.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::crypto::{Envelope, ShareSecret};
use crate::errors::{NoteError, Result};
use crate::store::{persist_note, select_live_store, NoteStore, RedisStore, RestStore};

use super::NoteUrl;

/// Storage key holding a note's encrypted envelope.
pub fn envelope_key(note_id: &str) -> String {
    format!("note:{}", note_id)
}

/// Storage key holding a note's remaining read counter.
pub fn counter_key(note_id: &str) -> String {
    format!("note:{}:reads", note_id)
}

/// Which adapter family a service talks to.
///
/// The family is fixed when the service is built; a single service never
/// mixes direct and bridged stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFamily {
    /// Direct key-value protocol against each configured store URL.
    Direct,
    /// The HTTP bridge described by the `rest` configuration block.
    Rest,
}

impl StoreFamily {
    /// Lowercase label used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Rest => "rest",
        }
    }
}

/// Creates and opens notes against an ordered list of stores.
///
/// Writes fail over store by store and reads probe for the first live
/// store. The service never holds plaintext or key material beyond the
/// call that needs it.
#[derive(Debug)]
pub struct NoteService {
    stores: Vec<Arc<dyn NoteStore>>,
    family: StoreFamily,
    default_ttl_seconds: u64,
    default_max_reads: u32,
}

impl NoteService {
    /// Build a service over explicit stores.
    ///
    /// Most callers want [`NoteService::from_config`]; this constructor is
    /// the seam for embedding custom [`NoteStore`] implementations.
    ///
    /// # Errors
    ///
    /// Returns an error when `stores` is empty.
    pub fn new(
        stores: Vec<Arc<dyn NoteStore>>,
        family: StoreFamily,
        default_ttl_seconds: u64,
        default_max_reads: u32,
    ) -> Result<Self> {
        if stores.is_empty() {
            return Err(NoteError::config("at least one store is required"));
        }
        Ok(Self { stores, family, default_ttl_seconds, default_max_reads })
    }

    /// Build a service for one store family from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration fails validation, when a
    /// store URL cannot be parsed, or when [`StoreFamily::Rest`] is
    /// requested without a configured bridge.
    pub fn from_config(config: &AppConfig, family: StoreFamily) -> Result<Self> {
        config.validate()?;
        let timeout = config.store_timeout();

        let stores: Vec<Arc<dyn NoteStore>> = match family {
            StoreFamily::Direct => config
                .store_urls
                .iter()
                .map(|url| {
                    RedisStore::connect(url, timeout)
                        .map(|store| Arc::new(store) as Arc<dyn NoteStore>)
                })
                .collect::<Result<_>>()?,
            StoreFamily::Rest => {
                let rest = config.rest.as_ref().ok_or_else(|| {
                    NoteError::config(
                        "store family 'rest' requires SEALNOTE_REST_URL and SEALNOTE_REST_TOKEN",
                    )
                })?;
                vec![Arc::new(RestStore::new(rest, timeout)?)]
            }
        };

        Self::new(stores, family, config.default_ttl_seconds, config.default_max_reads)
    }

    /// The family this service was built for.
    pub fn family(&self) -> StoreFamily {
        self.family
    }

    /// TTL applied when the caller does not pick one.
    pub fn default_ttl_seconds(&self) -> u64 {
        self.default_ttl_seconds
    }

    /// Read budget applied when the caller does not pick one.
    pub fn default_max_reads(&self) -> u32 {
        self.default_max_reads
    }

    /// Encrypt `plaintext` and persist it to the first store that accepts
    /// both the envelope and its read counter.
    ///
    /// The returned URL is the only copy of the decryption capability;
    /// neither the plaintext nor the share secret is retained or logged.
    ///
    /// # Errors
    ///
    /// Returns an error when `ttl_seconds` or `max_reads` is zero, when
    /// encryption fails, or when every store rejects the write.
    pub async fn create_note(
        &self,
        plaintext: &str,
        ttl_seconds: u64,
        max_reads: u32,
    ) -> Result<NoteUrl> {
        if ttl_seconds == 0 {
            return Err(NoteError::config("note TTL must be at least 1 second"));
        }
        if max_reads == 0 {
            return Err(NoteError::config("read budget must be at least 1"));
        }

        let note_id = Uuid::new_v4().simple().to_string();
        let secret = ShareSecret::generate();
        let envelope = Envelope::seal(plaintext, &secret)?;
        let payload = envelope.to_json()?;

        let store = persist_note(
            &self.stores,
            &envelope_key(&note_id),
            &payload,
            &counter_key(&note_id),
            max_reads,
            ttl_seconds,
        )
        .await?;

        info!(
            note_id = %note_id,
            store = %store,
            family = %self.family.as_str(),
            ttl_seconds,
            max_reads,
            "note created"
        );

        NoteUrl::new(note_id, secret)
    }

    /// Atomically consume one read of the note named by `url` and return
    /// its plaintext.
    ///
    /// The last permitted read removes the note; later calls, like calls
    /// after expiry, fail with [`NoteError::NotAvailable`]. Which of the
    /// two happened is not revealed.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NotAvailable`] when the note is gone,
    /// [`NoteError::Authentication`] when the secret does not decrypt the
    /// envelope, and a backend error when no store answers.
    pub async fn open_note(&self, url: &NoteUrl) -> Result<String> {
        let store = select_live_store(&self.stores).await?;
        let raw = store
            .read_decay(&envelope_key(url.note_id()), &counter_key(url.note_id()))
            .await?
            .ok_or(NoteError::NotAvailable)?;

        let envelope = Envelope::from_json(&raw)?;
        let plaintext = envelope.open(url.secret())?;

        info!(note_id = %url.note_id(), store = %store.location(), "note opened");
        Ok(plaintext)
    }

    /// Probe every store and report `(location, healthy)` pairs in
    /// configured order.
    pub async fn probe_stores(&self) -> Vec<(String, bool)> {
        let mut report = Vec::with_capacity(self.stores.len());
        for store in &self.stores {
            let healthy = store.health_check().await;
            report.push((store.location().to_string(), healthy));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_config() -> AppConfig {
        AppConfig {
            store_urls: vec!["redis://127.0.0.1:6399".to_string()],
            ..AppConfig::default()
        }
    }

    #[test]
    fn key_naming_matches_storage_scheme() {
        assert_eq!(envelope_key("abc"), "note:abc");
        assert_eq!(counter_key("abc"), "note:abc:reads");
    }

    #[test]
    fn from_config_builds_one_store_per_url() {
        let config = AppConfig {
            store_urls: vec![
                "redis://127.0.0.1:6399".to_string(),
                "redis://127.0.0.1:6398".to_string(),
            ],
            ..AppConfig::default()
        };

        let service = NoteService::from_config(&config, StoreFamily::Direct).unwrap();
        assert_eq!(service.family(), StoreFamily::Direct);
        assert_eq!(service.stores.len(), 2);
        assert_eq!(service.default_ttl_seconds(), 3600);
        assert_eq!(service.default_max_reads(), 1);
    }

    #[test]
    fn from_config_rejects_rest_family_without_bridge() {
        let err = NoteService::from_config(&direct_config(), StoreFamily::Rest).unwrap_err();
        assert!(matches!(err, NoteError::Config { .. }));
        assert!(err.to_string().contains("SEALNOTE_REST_URL"));
    }

    #[test]
    fn new_rejects_empty_store_list() {
        let err = NoteService::new(Vec::new(), StoreFamily::Direct, 60, 1).unwrap_err();
        assert!(matches!(err, NoteError::Config { .. }));
    }

    #[tokio::test]
    async fn create_note_validates_arguments_before_touching_stores() {
        // Connecting is lazy, so a service over an unreachable URL is fine
        // as long as validation fails first.
        let service = NoteService::from_config(&direct_config(), StoreFamily::Direct).unwrap();

        let err = service.create_note("hello", 0, 1).await.unwrap_err();
        assert!(err.to_string().contains("TTL"));

        let err = service.create_note("hello", 60, 0).await.unwrap_err();
        assert!(err.to_string().contains("read budget"));
    }

    #[test]
    fn family_labels_are_lowercase() {
        assert_eq!(StoreFamily::Direct.as_str(), "direct");
        assert_eq!(StoreFamily::Rest.as_str(), "rest");
    }
}
