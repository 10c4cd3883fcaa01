//! Route definitions for the `/admin` resource (admin role required).

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST /users/{id}/deactivate   -> deactivate account + kill session
/// POST /users/{id}/force-logout -> kill session only
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/deactivate", post(admin::deactivate_user))
        .route("/users/{id}/force-logout", post(admin::force_logout_user))
}
