//! Shared application state passed to all handlers.

use std::sync::Arc;

use heartdays_core::directory::UserDirectory;
use heartdays_db::DbPool;
use heartdays_store::SessionStore;

use crate::auth::lifecycle::SessionLifecycle;
use crate::config::ServerConfig;

/// Application-wide shared state.
///
/// Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Postgres pool, absent when the server runs against an in-memory
    /// directory (integration tests).
    pub pool: Option<DbPool>,
    pub config: Arc<ServerConfig>,
    pub directory: Arc<dyn UserDirectory>,
    pub sessions: SessionStore,
    pub lifecycle: SessionLifecycle,
}

impl AppState {
    pub fn new(
        pool: Option<DbPool>,
        config: Arc<ServerConfig>,
        directory: Arc<dyn UserDirectory>,
        sessions: SessionStore,
    ) -> Self {
        let lifecycle = SessionLifecycle::new(
            directory.clone(),
            sessions.clone(),
            Arc::new(config.jwt.clone()),
            config.transport_secret.clone(),
        );
        Self {
            pool,
            config,
            directory,
            sessions,
            lifecycle,
        }
    }
}
