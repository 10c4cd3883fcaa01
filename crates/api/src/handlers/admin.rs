//! Admin handlers for user/session management. All routes here require the
//! admin role.

use axum::extract::{Path, State};
use axum::http::StatusCode;

use heartdays_core::error::AuthError;
use heartdays_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// POST /admin/users/{id}/deactivate
///
/// Deactivate an account and tear down its live session so every issued
/// token stops working immediately. 404 when the user is missing or
/// already inactive.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !state.directory.deactivate(user_id).await? {
        return Err(AuthError::NotFound("User not found".to_string()).into());
    }
    state.lifecycle.logout(user_id).await?;

    tracing::info!(admin_id = admin.user_id, user_id, "Admin deactivated user");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/users/{id}/force-logout
///
/// Tear down a user's live session without touching the account.
/// Idempotent; a user with no session is still a 204.
pub async fn force_logout_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.lifecycle.logout(user_id).await?;

    tracing::info!(admin_id = admin.user_id, user_id, "Admin forced logout");
    Ok(StatusCode::NO_CONTENT)
}
