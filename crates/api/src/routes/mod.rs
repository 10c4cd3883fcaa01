pub mod admin;
pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                  create an account (public)
/// /auth/login                     login (public)
/// /auth/refresh                   refresh (public)
/// /auth/logout                    logout (requires auth)
/// /auth/session                   current session info (requires auth)
/// /auth/me                        current user record (requires auth)
///
/// /admin/users/{id}/deactivate    deactivate account (admin only)
/// /admin/users/{id}/force-logout  kill session (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
