//! The typed session store.
//!
//! [`SessionStore`] owns all mutation of the session key spaces; no other
//! component writes these keys. Login and refresh rebuild the whole
//! denormalized set in one [`WriteBatch`], ordered so the access-token
//! mapping (the key consulted on every request) lands last -- a partially
//! applied sequence can only reject, never accept.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use heartdays_core::types::DbId;

use crate::keys;
use crate::kv::{KvStore, StoreError, WriteBatch};
use crate::records::{AccessTokenEntry, NewSession, RefreshTokenEntry, SessionRecord};

/// Access-token lifetime: 2 hours.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Refresh-token (and session-record) lifetime: 7 days.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Presence marker lifetime: 10 minutes.
pub const PRESENCE_TTL: Duration = Duration::from_secs(10 * 60);

/// Rolling window for the refresh throttle.
pub const REFRESH_WINDOW: Duration = Duration::from_secs(60);

/// Maximum successful refresh attempts per user per window.
pub const MAX_REFRESH_ATTEMPTS: i64 = 3;

/// Typed facade over the key-value store for session state.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    async fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.kv.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
        Ok(serde_json::to_value(value)?)
    }

    /// Install a freshly minted session for a user, superseding whatever was
    /// there before.
    ///
    /// One batch, in order:
    /// 1. delete the previous refresh mapping found via the user pointer
    ///    (explicit rotation -- the old refresh token is dead immediately,
    ///    not merely unreachable until its TTL lapses);
    /// 2. write the new refresh mapping (7 d);
    /// 3. write the user -> refresh-token pointer (7 d);
    /// 4. write the session record (7 d);
    /// 5. write the access-token mapping (2 h) last.
    pub async fn install_session(&self, new: &NewSession) -> Result<(), StoreError> {
        let created_at = chrono::Utc::now();

        let mut batch = WriteBatch::new();

        if let Some(old_refresh) = self
            .get_typed::<String>(&keys::user_refresh_pointer(new.user_id))
            .await?
        {
            if old_refresh != new.refresh_token {
                batch.delete(keys::refresh_token(&old_refresh));
            }
        }

        let refresh_entry = RefreshTokenEntry {
            user_id: new.user_id,
            session_token: new.session_token.clone(),
            refresh_token: new.refresh_token.clone(),
            device_id: new.device_id.clone(),
            user_agent: new.user_agent.clone(),
            device_info: new.device_info.clone(),
            created_at,
        };
        batch.set(
            keys::refresh_token(&new.refresh_token),
            Self::to_value(&refresh_entry)?,
            Some(REFRESH_TOKEN_TTL),
        );

        batch.set(
            keys::user_refresh_pointer(new.user_id),
            serde_json::Value::String(new.refresh_token.clone()),
            Some(REFRESH_TOKEN_TTL),
        );

        let session = SessionRecord {
            session_token: new.session_token.clone(),
            refresh_token: new.refresh_token.clone(),
            device_id: new.device_id.clone(),
            user_agent: new.user_agent.clone(),
            device_info: new.device_info.clone(),
            created_at,
        };
        batch.set(
            keys::session(new.user_id),
            Self::to_value(&session)?,
            Some(REFRESH_TOKEN_TTL),
        );

        let access_entry = AccessTokenEntry {
            user_id: new.user_id,
            session_token: new.session_token.clone(),
            refresh_token: new.refresh_token.clone(),
        };
        batch.set(
            keys::access_token(&new.session_token),
            Self::to_value(&access_entry)?,
            Some(ACCESS_TOKEN_TTL),
        );

        self.kv.apply(batch).await
    }

    /// Increment the user's refresh attempt counter and report whether this
    /// attempt is within the limit.
    ///
    /// The counter counts attempts, not successes: it is bumped before the
    /// caller knows whether the refresh will go through. Increment-then-check
    /// is intentionally permissive under concurrency -- this is a throttle,
    /// not a hard quota.
    pub async fn check_refresh_limit(&self, user_id: DbId) -> Result<bool, StoreError> {
        let key = keys::refresh_limit(user_id);
        let count = self.kv.increment(&key).await?;
        if count == 1 {
            self.kv.expire(&key, REFRESH_WINDOW).await?;
        }
        Ok(count <= MAX_REFRESH_ATTEMPTS)
    }

    /// Resolve a refresh token and enforce device binding.
    ///
    /// Device-id takes priority: when both the mapping and the caller carry
    /// one, they must match exactly. Without a caller device-id the
    /// user-agent strings are compared instead. Browser clients rarely have
    /// a stable device id but should still be bound to *something*.
    pub async fn validate_refresh_token(
        &self,
        refresh_token: &str,
        user_agent: &str,
        device_id: Option<&str>,
    ) -> Result<Option<RefreshTokenEntry>, StoreError> {
        let Some(entry) = self
            .get_typed::<RefreshTokenEntry>(&keys::refresh_token(refresh_token))
            .await?
        else {
            return Ok(None);
        };

        if let (Some(given), Some(recorded)) = (device_id, entry.device_id.as_deref()) {
            if given != recorded {
                tracing::warn!(user_id = entry.user_id, "Refresh rejected: device id mismatch");
                return Ok(None);
            }
        } else if device_id.is_none()
            && !user_agent.is_empty()
            && !entry.user_agent.is_empty()
            && user_agent != entry.user_agent
        {
            tracing::warn!(user_id = entry.user_id, "Refresh rejected: user-agent mismatch");
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// The user's current session record, if any.
    pub async fn get_user_session(
        &self,
        user_id: DbId,
    ) -> Result<Option<SessionRecord>, StoreError> {
        self.get_typed(&keys::session(user_id)).await
    }

    /// Resolve a presented session token against the live access-token
    /// mapping.
    pub async fn validate_session_token(
        &self,
        session_token: &str,
    ) -> Result<Option<AccessTokenEntry>, StoreError> {
        self.get_typed(&keys::access_token(session_token)).await
    }

    /// Tear down the user's session entirely (logout).
    ///
    /// Idempotent: a user with no live session is a no-op.
    pub async fn invalidate_session(&self, user_id: DbId) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();

        if let Some(session) = self.get_user_session(user_id).await? {
            batch
                .delete(keys::access_token(&session.session_token))
                .delete(keys::refresh_token(&session.refresh_token))
                .delete(keys::user_refresh_pointer(user_id))
                .delete(keys::presence(user_id));
        }
        batch.delete(keys::session(user_id));

        self.kv.apply(batch).await
    }

    /// Invalidate every token belonging to the user's current session when
    /// that session is not `keep_session_token` (single-device takeover).
    ///
    /// The session record itself is left in place; the caller immediately
    /// overwrites it via [`SessionStore::install_session`], or deletes it via
    /// [`SessionStore::invalidate_session`].
    pub async fn force_logout_other_devices(
        &self,
        user_id: DbId,
        keep_session_token: &str,
    ) -> Result<(), StoreError> {
        let Some(session) = self.get_user_session(user_id).await? else {
            return Ok(());
        };
        if session.session_token == keep_session_token {
            return Ok(());
        }

        tracing::info!(user_id, "Single-device takeover: invalidating previous session");
        let mut batch = WriteBatch::new();
        batch
            .delete(keys::access_token(&session.session_token))
            .delete(keys::refresh_token(&session.refresh_token))
            .delete(keys::user_refresh_pointer(user_id));
        self.kv.apply(batch).await
    }

    /// Whether a session other than `current_session_token` owns the user's
    /// session slot.
    pub async fn is_logged_in_elsewhere(
        &self,
        user_id: DbId,
        current_session_token: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .get_user_session(user_id)
            .await?
            .is_some_and(|s| s.session_token != current_session_token))
    }

    /// Record a last-seen presence marker with a short TTL.
    pub async fn mark_online(&self, user_id: DbId) -> Result<(), StoreError> {
        self.kv
            .set(
                &keys::presence(user_id),
                serde_json::Value::String("1".into()),
                Some(PRESENCE_TTL),
            )
            .await
    }

    /// Best-effort hygiene pass: delete access/refresh mappings whose owning
    /// session record no longer names them.
    ///
    /// Correctness never depends on this running -- TTLs and the explicit
    /// deletions above already bound every key's lifetime.
    pub async fn sweep_stale_mappings(&self) -> Result<u64, StoreError> {
        // Reclaim physically-expired entries first so the scans below only
        // walk live keys.
        self.kv.purge_expired().await?;

        let mut deleted = 0u64;

        for key in self.kv.keys_matching("token:*").await? {
            let Some(entry) = self.get_typed::<AccessTokenEntry>(&key).await? else {
                continue;
            };
            let live = self
                .get_user_session(entry.user_id)
                .await?
                .is_some_and(|s| s.session_token == entry.session_token);
            if !live {
                self.kv.delete(&key).await?;
                deleted += 1;
            }
        }

        for key in self.kv.keys_matching("refresh_token:*").await? {
            let Some(entry) = self.get_typed::<RefreshTokenEntry>(&key).await? else {
                continue;
            };
            let live = self
                .get_user_session(entry.user_id)
                .await?
                .is_some_and(|s| s.refresh_token == entry.refresh_token);
            if !live {
                self.kv.delete(&key).await?;
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}
