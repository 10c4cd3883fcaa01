//! In-process TTL-aware key-value backend.
//!
//! Suitable for a single logical session store (the subsystem's stated
//! deployment model). Expired entries are invisible to reads immediately and
//! physically removed by `purge_expired`, which the periodic session sweep
//! triggers.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::kv::{pattern_matches, KvStore, StoreError, WriteBatch, WriteOp};

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory [`KvStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), StoreError> {
        let entry = Entry {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let next = match entries.get(key).filter(|e| !e.is_expired(now)) {
            None => 1,
            Some(entry) => {
                entry
                    .value
                    .as_i64()
                    .ok_or_else(|| StoreError::NotACounter {
                        key: key.to_string(),
                    })?
                    + 1
            }
        };

        // A fresh counter starts with no expiry; the caller sets the window
        // via `expire` when the count comes back as 1.
        let expires_at = entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .and_then(|e| e.expires_at);
        entries.insert(
            key.to_string(),
            Entry {
                value: Value::from(next),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(k, e)| !e.is_expired(now) && pattern_matches(pattern, k))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        // One write lock for the whole batch: concurrent readers observe
        // either none or all of the writes.
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        for op in batch.ops() {
            match op {
                WriteOp::Set { key, value, ttl } => {
                    entries.insert(
                        key.clone(),
                        Entry {
                            value: value.clone(),
                            expires_at: ttl.map(|d| now + d),
                        },
                    );
                }
                WriteOp::Delete { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        Ok((before - entries.len()) as u64)
    }
}
