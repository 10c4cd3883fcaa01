//! Key-value store abstraction.
//!
//! The store holds structured JSON values under string keys with optional
//! per-key expiry. It carries no business logic; it exists so the session
//! key spaces are explicit and testable independent of a concrete backing
//! technology.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Error from the backing key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Value under '{key}' is not a counter")]
    NotACounter { key: String },

    /// Transport/backend failure (connection loss, timeout, ...).
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// A single operation inside a [`WriteBatch`].
#[derive(Debug, Clone)]
pub enum WriteOp {
    Set {
        key: String,
        value: Value,
        ttl: Option<Duration>,
    },
    Delete {
        key: String,
    },
}

/// An ordered set of writes applied as one unit.
///
/// Backends must apply the whole batch or none of it, in order. Login and
/// refresh rebuild up to five keys per call; applying them as a batch closes
/// the window where a request could observe a partially-constructed session.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: Value,
        ttl: Option<Duration>,
    ) -> &mut Self {
        self.ops.push(WriteOp::Set {
            key: key.into(),
            value,
            ttl,
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete { key: key.into() });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

/// A key-value store with per-key expiry.
///
/// All values are opaque JSON to the store itself. Expired keys behave as
/// absent for every read operation.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Read a value. Returns `None` for missing or expired keys.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a value, replacing any previous one. `ttl = None` means the key
    /// never expires.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Delete a key. Deleting a missing key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Atomically increment an integer counter, creating it at 1 (with no
    /// expiry) when missing or expired. Returns the post-increment value.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Set the expiry of an existing key. Returns `false` when the key does
    /// not exist (or has already expired).
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// List live keys matching a glob pattern (`*` matches any run of
    /// characters).
    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Apply a [`WriteBatch`] as a single unit.
    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Physically reclaim expired entries, returning the number removed.
    /// Backends that expire keys on their own can leave this a no-op.
    async fn purge_expired(&self) -> Result<u64, StoreError> {
        Ok(0)
    }
}

/// Glob matching for `keys_matching` patterns. Only `*` is special.
pub(crate) fn pattern_matches(pattern: &str, key: &str) -> bool {
    fn matches(p: &[u8], k: &[u8]) -> bool {
        match (p.first(), k.first()) {
            (None, None) => true,
            (Some(b'*'), _) => {
                // `*` swallows zero or more bytes.
                matches(&p[1..], k) || (!k.is_empty() && matches(p, &k[1..]))
            }
            (Some(pc), Some(kc)) if pc == kc => matches(&p[1..], &k[1..]),
            _ => false,
        }
    }
    matches(pattern.as_bytes(), key.as_bytes())
}
