//! Auth error taxonomy.
//!
//! Every failure in the session/token subsystem maps to exactly one variant
//! here, and every variant carries a stable machine-readable code so clients
//! can branch on behaviour (`TOKEN_EXPIRED` -> silently refresh,
//! `SESSION_INVALID` -> force re-login, `TOO_MANY_REQUESTS` -> back off)
//! without parsing human-readable messages.

/// Domain-level authentication/session error.
///
/// `TokenExpired` and `RefreshTokenInvalid` are routine conditions the client
/// is expected to recover from; `TokenInvalid` and `SessionInvalid` indicate
/// tampering or a superseded session and should prompt an unconditional
/// re-login.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Account missing, inactive, wrong password, or undecryptable password
    /// payload. Deliberately a single variant: login must not distinguish
    /// "account not found" from "wrong password".
    #[error("Invalid account or password")]
    InvalidCredentials,

    /// No bearer token was presented.
    #[error("Missing authentication token")]
    TokenMissing,

    /// The access token's `exp` claim has passed.
    #[error("Access token has expired")]
    TokenExpired,

    /// Signature failure or malformed token.
    #[error("Access token is invalid")]
    TokenInvalid,

    /// A structurally valid token that carries no embedded session token.
    #[error("Access token carries no session token")]
    TokenMissingSession,

    /// The embedded session token no longer resolves to a live session, or
    /// resolves to a session owned by a different user.
    #[error("Session is no longer valid, please log in again")]
    SessionInvalid,

    /// The refresh token is unknown, expired, or failed device binding.
    #[error("Refresh token is invalid or expired")]
    RefreshTokenInvalid,

    /// Refresh throttle exceeded (more than 3 attempts in 60 seconds).
    #[error("Too many refresh attempts, please try again later")]
    TooManyRequests,

    /// Referenced user is missing or deactivated.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or incomplete request input.
    #[error("Invalid parameters: {0}")]
    ParamsError(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Backing store or other internal failure. The inner message is logged
    /// server-side and never sent to clients verbatim.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::TokenMissing => "TOKEN_MISSING",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenInvalid => "TOKEN_INVALID",
            AuthError::TokenMissingSession => "TOKEN_MISSING_SESSION",
            AuthError::SessionInvalid => "SESSION_INVALID",
            AuthError::RefreshTokenInvalid => "REFRESH_TOKEN_INVALID",
            AuthError::TooManyRequests => "TOO_MANY_REQUESTS",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::ParamsError(_) => "PARAMS_ERROR",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
