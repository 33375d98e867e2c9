//! Key-value store backends.
//!
//! The cache layer talks to an injectable [`KeyValueBackend`]; the process
//! entry point decides which implementation to wire in:
//!
//! - [`RedisKv`]: ConnectionManager-based async Redis
//! - [`MemoryKv`]: in-process map with TTL, for tests and cache-less dev
//! - [`NoopKv`]: always-miss, always-succeed fallback when Redis is down
//!
//! Backends report failures through [`KvError`]; absorbing those failures
//! into "cache absent" results is the cache service's job, not theirs.

mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use self::memory::{MemoryKv, NoopKv};
pub use self::redis::RedisKv;

/// TTL answer for a key that does not exist, mirroring the store protocol.
pub const TTL_MISSING: i64 = -2;
/// TTL answer for a key that exists without an expiry.
pub const TTL_NO_EXPIRY: i64 = -1;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),
    #[error("key-value command timed out after {0:?}")]
    Timeout(Duration),
    #[error("key-value protocol error: {0}")]
    Protocol(String),
}

/// Minimal string-oriented contract over a remote key-value store.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;

    /// Returns true when the key existed.
    async fn delete(&self, key: &str) -> Result<bool, KvError>;

    /// Delete every key matching a `prefix:*` glob pattern; returns the
    /// number of keys removed.
    async fn delete_matching(&self, pattern: &str) -> Result<u64, KvError>;

    async fn exists(&self, key: &str) -> Result<bool, KvError>;

    /// Remaining TTL in seconds; [`TTL_MISSING`] when absent,
    /// [`TTL_NO_EXPIRY`] when the key has no expiry.
    async fn ttl(&self, key: &str) -> Result<i64, KvError>;

    /// Atomic add; the key is created at zero when absent. Returns the new
    /// value.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, KvError>;

    async fn ping(&self) -> Result<(), KvError>;
}
