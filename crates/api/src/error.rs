use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use heartdays_core::error::AuthError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`AuthError`] for domain errors and implements [`IntoResponse`] to
/// produce consistent `{ "error": ..., "code": ... }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `heartdays_core`.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials
        | AuthError::TokenMissing
        | AuthError::TokenExpired
        | AuthError::TokenInvalid
        | AuthError::TokenMissingSession
        | AuthError::SessionInvalid
        | AuthError::RefreshTokenInvalid => StatusCode::UNAUTHORIZED,
        AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        AuthError::NotFound(_) => StatusCode::NOT_FOUND,
        AuthError::ParamsError(_) => StatusCode::BAD_REQUEST,
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Auth(auth) => {
                let status = status_for(auth);
                let message = match auth {
                    // Internal details stay server-side.
                    AuthError::Internal(msg) => {
                        tracing::error!(error = %msg, "Internal error");
                        "An internal error occurred".to_string()
                    }
                    other => other.to_string(),
                };
                (status, auth.code(), message)
            }
            AppError::Database(err) => classify_sqlx_error(err),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
