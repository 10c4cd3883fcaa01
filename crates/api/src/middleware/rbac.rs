//! Role-based access control extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use heartdays_core::error::AuthError;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Extractor that requires the authenticated user to hold the admin role.
///
/// Wraps the full [`AuthUser`], so handlers still see who the admin is.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AuthError::Forbidden("Admin role required".to_string()).into());
        }
        Ok(RequireAdmin(user))
    }
}
