//! Handlers for the `/auth` resource (register, login, refresh, logout,
//! session inspection).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};

use heartdays_core::directory::{NewUser, UserRecord};
use heartdays_core::error::AuthError;
use heartdays_core::roles::ROLE_USER;
use heartdays_core::types::DbId;
use heartdays_store::records::SessionRecord;

use crate::auth::lifecycle::TokenBundle;
use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::middleware::{AuthUser, Device};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub account: String,
    pub email: String,
    /// Transport-obfuscated password payload.
    pub password: String,
    /// Optional display name; a `user_xxxxxxxx` name is generated when
    /// absent.
    pub name: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub account: String,
    /// Transport-obfuscated password payload.
    pub password: String,
    /// Stable device identifier from native clients. Falls back to the
    /// `X-Device-Id` header when absent.
    pub device_id: Option<String>,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
    pub device_id: Option<String>,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenBundle,
    pub user: UserInfo,
}

/// Public user info; never exposes the password hash.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub account: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<&UserRecord> for UserInfo {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            account: user.account.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Response body for `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionRecord,
    /// Whether another device currently owns the user's session slot.
    pub logged_in_elsewhere: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create a new account. The password arrives transport-obfuscated like at
/// login. Returns 201 with the public user record; registration does not
/// log the user in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserInfo>>)> {
    let account = input.account.trim();
    if account.is_empty() {
        return Err(AuthError::ParamsError("Account must not be empty".into()).into());
    }
    let email = input.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::ParamsError("A valid email is required".into()).into());
    }

    let plaintext =
        crate::auth::transport::deobfuscate(&input.password, &state.config.transport_secret)
            .map_err(|_| AuthError::ParamsError("Password payload is malformed".to_string()))?;
    password::validate_password_strength(&plaintext)?;

    if state.directory.account_exists(account).await? {
        return Err(AuthError::ParamsError("Account is already taken".into()).into());
    }
    if state.directory.email_exists(email).await? {
        return Err(AuthError::ParamsError("Email is already registered".into()).into());
    }

    let name = match input.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => generated_name(),
    };

    let user = state
        .directory
        .insert(&NewUser {
            account: account.to_string(),
            name,
            email: email.to_string(),
            password_hash: password::hash_password(&plaintext)?,
            roles: vec![ROLE_USER.to_string()],
        })
        .await?;

    tracing::info!(user_id = user.id, account = %user.account, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserInfo::from(&user),
        }),
    ))
}

/// POST /auth/login
///
/// Authenticate with account + obfuscated password. Installs a fresh
/// session, superseding any session on another device, and returns the
/// token set.
pub async fn login(
    State(state): State<AppState>,
    Device(mut device): Device,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    if input.device_id.is_some() {
        device.device_id = input.device_id.clone();
    }

    let (user, tokens) = state
        .lifecycle
        .login(&input.account, &input.password, &device)
        .await?;

    Ok(Json(DataResponse {
        data: AuthResponse {
            tokens,
            user: UserInfo::from(&user),
        },
    }))
}

/// POST /auth/refresh
///
/// Exchange a valid refresh token for a fresh token set. The old refresh
/// token is dead the moment this succeeds.
pub async fn refresh(
    State(state): State<AppState>,
    Device(mut device): Device,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    if input.device_id.is_some() {
        device.device_id = input.device_id.clone();
    }

    let (user, tokens) = state
        .lifecycle
        .refresh(&input.refresh_token, &device)
        .await?;

    Ok(Json(DataResponse {
        data: AuthResponse {
            tokens,
            user: UserInfo::from(&user),
        },
    }))
}

/// POST /auth/logout
///
/// Tear down the authenticated user's session. Idempotent; returns 204.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.lifecycle.logout(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/session
///
/// The caller's current session record plus whether another device has
/// taken over the session slot.
pub async fn session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<SessionResponse>>> {
    let session = state
        .sessions
        .get_user_session(user.user_id)
        .await
        .map_err(|e| AppError::Auth(AuthError::Internal(e.to_string())))?
        .ok_or(AuthError::SessionInvalid)?;

    let logged_in_elsewhere = state
        .sessions
        .is_logged_in_elsewhere(user.user_id, &user.session_token)
        .await
        .map_err(|e| AppError::Auth(AuthError::Internal(e.to_string())))?;

    Ok(Json(DataResponse {
        data: SessionResponse {
            session,
            logged_in_elsewhere,
        },
    }))
}

/// GET /auth/me
///
/// The authenticated user's current directory record. 404 when the account
/// was deactivated after the token was issued.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserInfo>>> {
    let record = state
        .directory
        .find_active(user.user_id)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    Ok(Json(DataResponse {
        data: UserInfo::from(&record),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn generated_name() -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 8)
        .to_lowercase();
    format!("user_{suffix}")
}
