//! Periodic hygiene sweep of the session key spaces.
//!
//! Deletes access/refresh mappings whose owning session record no longer
//! names them. TTLs and the explicit deletions in the session store already
//! bound every key's lifetime; the sweep just reclaims orphans earlier.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use heartdays_store::SessionStore;

/// How often the sweep runs by default.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600; // 1 hour

/// Run the session sweep loop until `cancel` is triggered.
///
/// The interval is overridable via `SESSION_SWEEP_INTERVAL_SECS`.
pub async fn run(sessions: SessionStore, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("SESSION_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

    tracing::info!(interval_secs, "Session sweep job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep job stopping");
                break;
            }
            _ = interval.tick() => {
                match sessions.sweep_stale_mappings().await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Session sweep: purged stale mappings");
                        } else {
                            tracing::debug!("Session sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep failed");
                    }
                }
            }
        }
    }
}
