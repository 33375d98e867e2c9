//! Redis backend over a multiplexed connection manager.
//!
//! Prefix purges iterate with cursored `SCAN MATCH` rather than `KEYS`, so
//! bulk invalidation never blocks the store. Every command is wrapped in a
//! timeout; a hung store degrades to a cache error the service layer
//! absorbs.

use std::future::Future;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::info;

use crate::config::RedisSettings;

use super::{KeyValueBackend, KvError};

const SCAN_BATCH: usize = 200;
const DEL_CHUNK: usize = 500;

impl From<redis::RedisError> for KvError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Protocol(err.to_string())
        }
    }
}

pub struct RedisKv {
    manager: ConnectionManager,
    command_timeout: Duration,
}

impl RedisKv {
    /// Connect and verify the store answers a PING before handing the
    /// backend out.
    pub async fn connect(settings: &RedisSettings) -> Result<Self, KvError> {
        let client = redis::Client::open(settings.url.as_str()).map_err(KvError::from)?;
        let manager = ConnectionManager::new(client).await.map_err(KvError::from)?;

        let kv = Self {
            manager,
            command_timeout: Duration::from_millis(settings.command_timeout_ms),
        };
        kv.ping().await?;
        info!(url = %settings.url, "connected to key-value store");
        Ok(kv)
    }

    fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    async fn run<T, F>(&self, fut: F) -> Result<T, KvError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(result) => result.map_err(KvError::from),
            Err(_) => Err(KvError::Timeout(self.command_timeout)),
        }
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        let mut conn = self.connection();
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = self
                .run(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;
            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }
}

#[async_trait::async_trait]
impl KeyValueBackend for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.connection();
        self.run(conn.get(key)).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let mut conn = self.connection();
        self.run(conn.set_ex(key, value, ttl.as_secs().max(1)))
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let mut conn = self.connection();
        let removed: i64 = self.run(conn.del(key)).await?;
        Ok(removed > 0)
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, KvError> {
        let keys = self.scan_keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection();
        let mut removed: u64 = 0;
        for chunk in keys.chunks(DEL_CHUNK) {
            let count: i64 = self.run(conn.del(chunk)).await?;
            removed += count.max(0) as u64;
        }
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        let mut conn = self.connection();
        self.run(conn.exists(key)).await
    }

    async fn ttl(&self, key: &str) -> Result<i64, KvError> {
        let mut conn = self.connection();
        self.run(conn.ttl(key)).await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, KvError> {
        let mut conn = self.connection();
        self.run(conn.incr(key, delta)).await
    }

    async fn ping(&self) -> Result<(), KvError> {
        let mut conn = self.connection();
        let answer: String = self.run(redis::cmd("PING").query_async(&mut conn)).await?;
        if answer == "PONG" {
            Ok(())
        } else {
            Err(KvError::Protocol(format!("unexpected PING reply `{answer}`")))
        }
    }
}
