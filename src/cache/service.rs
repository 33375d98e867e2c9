//! Read-through cache over the key-value backend.
//!
//! Every operation degrades to a "cache absent" result when the store is
//! unreachable: a get misses, a set reports false, a purge removes nothing.
//! Callers never see a cache failure — the document store remains the
//! source of truth and the cache a pure accelerator.

use std::future::Future;
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::infra::kv::{KeyValueBackend, KvError, TTL_MISSING};

use super::config::{CacheConfig, Ttl};
use super::keys::{CacheKey, KeyPrefix};

#[derive(Clone)]
pub struct CacheService {
    backend: Arc<dyn KeyValueBackend>,
    config: CacheConfig,
}

impl CacheService {
    pub fn new(backend: Arc<dyn KeyValueBackend>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Fetch and deserialize a cached value. Misses, store failures, and
    /// corrupt payloads all read as `None`; a corrupt payload is deleted so
    /// it cannot shadow the key until expiry.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        if !self.config.enabled {
            return None;
        }
        let rendered = key.to_string();
        let raw = match self.backend.get(&rendered).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %rendered, "cache miss");
                counter!("vellum_cache_miss_total").increment(1);
                return None;
            }
            Err(err) => {
                self.note_degraded("get", &rendered, &err);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %rendered, "cache hit");
                counter!("vellum_cache_hit_total").increment(1);
                Some(value)
            }
            Err(err) => {
                warn!(key = %rendered, error = %err, "corrupt cache payload, deleting");
                counter!("vellum_cache_error_total").increment(1);
                if let Err(err) = self.backend.delete(&rendered).await {
                    self.note_degraded("delete", &rendered, &err);
                }
                None
            }
        }
    }

    /// Serialize and store a value under the named TTL tier. Returns false
    /// when the write did not happen (store down, serialization failure, or
    /// cache disabled).
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Ttl) -> bool {
        if !self.config.enabled {
            return false;
        }
        let rendered = key.to_string();
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key = %rendered, error = %err, "cache payload serialization failed");
                counter!("vellum_cache_error_total").increment(1);
                return false;
            }
        };

        let ttl = self.config.duration(ttl);
        match self.backend.set_ex(&rendered, &payload, ttl).await {
            Ok(()) => {
                debug!(key = %rendered, ttl_secs = ttl.as_secs(), "cache set");
                counter!("vellum_cache_set_total").increment(1);
                true
            }
            Err(err) => {
                self.note_degraded("set", &rendered, &err);
                false
            }
        }
    }

    /// Read-through composition: serve from cache, otherwise run the fetch
    /// and store its result. A fetch error is returned untouched and caches
    /// nothing.
    pub async fn get_or_set<T, E, F, Fut>(&self, key: &CacheKey, ttl: Ttl, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }
        let value = fetch().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    pub async fn delete(&self, key: &CacheKey) -> bool {
        let rendered = key.to_string();
        match self.backend.delete(&rendered).await {
            Ok(existed) => {
                debug!(key = %rendered, existed, "cache delete");
                existed
            }
            Err(err) => {
                self.note_degraded("delete", &rendered, &err);
                false
            }
        }
    }

    /// Purge every key under a prefix; returns the number removed.
    pub async fn purge_prefix(&self, prefix: &KeyPrefix) -> u64 {
        let pattern = prefix.pattern();
        match self.backend.delete_matching(&pattern).await {
            Ok(removed) => {
                debug!(pattern = %pattern, removed, "cache prefix purge");
                counter!("vellum_cache_purge_total").increment(removed);
                removed
            }
            Err(err) => {
                self.note_degraded("purge", &pattern, &err);
                0
            }
        }
    }

    pub async fn exists(&self, key: &CacheKey) -> bool {
        let rendered = key.to_string();
        match self.backend.exists(&rendered).await {
            Ok(exists) => exists,
            Err(err) => {
                self.note_degraded("exists", &rendered, &err);
                false
            }
        }
    }

    /// Remaining TTL in seconds; -2 when absent or unreachable.
    pub async fn ttl(&self, key: &CacheKey) -> i64 {
        let rendered = key.to_string();
        match self.backend.ttl(&rendered).await {
            Ok(ttl) => ttl,
            Err(err) => {
                self.note_degraded("ttl", &rendered, &err);
                TTL_MISSING
            }
        }
    }

    /// Atomic counter add on a raw key; `None` when the store is down.
    pub async fn increment(&self, key: &str, delta: i64) -> Option<i64> {
        match self.backend.incr_by(key, delta).await {
            Ok(value) => Some(value),
            Err(err) => {
                self.note_degraded("incr", key, &err);
                None
            }
        }
    }

    pub async fn decrement(&self, key: &str, delta: i64) -> Option<i64> {
        self.increment(key, -delta).await
    }

    fn note_degraded(&self, op: &'static str, key: &str, err: &KvError) {
        warn!(op, key, error = %err, "cache unavailable, degrading to store");
        counter!("vellum_cache_error_total").increment(1);
    }
}
