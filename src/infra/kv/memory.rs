//! In-process key-value backends.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{KeyValueBackend, KvError, TTL_MISSING, TTL_NO_EXPIRY};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// `None` for counters, which the store protocol leaves unexpiring.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory backend with TTL semantics matching the remote store closely
/// enough for tests and cache-less development. Expiry is lazy: entries are
/// dropped when touched past their deadline.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_entry(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) -> Option<Entry> {
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.clone()),
            None => None,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned map only means a test panicked mid-operation; the data
        // is still structurally sound.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueBackend for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        let mut entries = self.lock();
        Ok(Self::live_entry(&mut entries, key, now).map(|entry| entry.value))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let mut entries = self.lock();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let now = Instant::now();
        let mut entries = self.lock();
        let existed = Self::live_entry(&mut entries, key, now).is_some();
        entries.remove(key);
        Ok(existed)
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, KvError> {
        let Some(prefix) = pattern.strip_suffix('*') else {
            return Err(KvError::Protocol(format!(
                "unsupported pattern `{pattern}`: only trailing-star globs are generated"
            )));
        };
        let now = Instant::now();
        let mut entries = self.lock();
        let matched: Vec<String> = entries
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        entries.retain(|key, entry| !key.starts_with(prefix) && !entry.is_expired(now));
        Ok(matched.len() as u64)
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        let now = Instant::now();
        let mut entries = self.lock();
        Ok(Self::live_entry(&mut entries, key, now).is_some())
    }

    async fn ttl(&self, key: &str) -> Result<i64, KvError> {
        let now = Instant::now();
        let mut entries = self.lock();
        match Self::live_entry(&mut entries, key, now) {
            Some(Entry {
                expires_at: Some(at),
                ..
            }) => Ok(at.saturating_duration_since(now).as_secs() as i64),
            Some(Entry {
                expires_at: None, ..
            }) => Ok(TTL_NO_EXPIRY),
            None => Ok(TTL_MISSING),
        }
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, KvError> {
        let now = Instant::now();
        let mut entries = self.lock();
        let current = match Self::live_entry(&mut entries, key, now) {
            Some(entry) => entry
                .value
                .parse::<i64>()
                .map_err(|_| KvError::Protocol(format!("key `{key}` holds a non-integer value")))?,
            None => 0,
        };
        let next = current + delta;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: None,
            },
        );
        Ok(next)
    }

    async fn ping(&self) -> Result<(), KvError> {
        Ok(())
    }
}

/// Always-miss, always-succeed backend wired in when the remote store is
/// unreachable at startup: the API keeps serving from the document store
/// with no cache at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopKv;

#[async_trait]
impl KeyValueBackend for NoopKv {
    async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
        Ok(None)
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), KvError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool, KvError> {
        Ok(false)
    }

    async fn delete_matching(&self, _pattern: &str) -> Result<u64, KvError> {
        Ok(0)
    }

    async fn exists(&self, _key: &str) -> Result<bool, KvError> {
        Ok(false)
    }

    async fn ttl(&self, _key: &str) -> Result<i64, KvError> {
        Ok(TTL_MISSING)
    }

    async fn incr_by(&self, _key: &str, _delta: i64) -> Result<i64, KvError> {
        Ok(0)
    }

    async fn ping(&self) -> Result<(), KvError> {
        Err(KvError::Unavailable("no key-value store configured".into()))
    }
}
