//! Request-time authentication extractor.
//!
//! Validating the bearer token's signature is not enough: the embedded
//! session token must still resolve in the session store and belong to the
//! same user. A token signed for a superseded session passes signature
//! checks but fails here with `SESSION_INVALID`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use heartdays_core::error::AuthError;
use heartdays_core::types::DbId;

use crate::auth::jwt::decode_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the
/// `Authorization` header, cross-checked against the session store.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Login account name.
    pub account: String,
    /// The user's role set.
    pub roles: Vec<String>,
    /// The opaque session token this request authenticated under.
    pub session_token: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == heartdays_core::roles::ROLE_ADMIN)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::TokenMissing)?;

        let claims = decode_access_token(token, &state.config.jwt)?;

        if claims.session_token.is_empty() {
            return Err(AuthError::TokenMissingSession.into());
        }

        let entry = state
            .sessions
            .validate_session_token(&claims.session_token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Session lookup failed");
                AuthError::Internal(e.to_string())
            })?
            .ok_or(AuthError::SessionInvalid)?;

        if entry.user_id != claims.sub {
            tracing::warn!(
                claimed = claims.sub,
                stored = entry.user_id,
                "Session token user mismatch"
            );
            return Err(AuthError::SessionInvalid.into());
        }

        // Presence is best-effort; never fail the request over it.
        if let Err(e) = state.sessions.mark_online(claims.sub).await {
            tracing::warn!(error = %e, user_id = claims.sub, "Failed to mark user online");
        }

        Ok(AuthUser {
            user_id: claims.sub,
            account: claims.account,
            roles: claims.roles,
            session_token: claims.session_token,
        })
    }
}
