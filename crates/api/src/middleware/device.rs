//! Per-request device context extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use heartdays_core::device::DeviceContext;

/// Collects the `User-Agent` header, client IP (from `X-Forwarded-For`),
/// and the optional `X-Device-Id` header. Never rejects; absent values
/// become empty/`None`.
#[derive(Debug, Clone)]
pub struct Device(pub DeviceContext);

impl<S: Send + Sync> FromRequestParts<S> for Device {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // First hop of X-Forwarded-For; absent when the server is reached
        // directly.
        let ip = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let device_id = parts
            .headers
            .get("x-device-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .filter(|v| !v.is_empty());

        Ok(Device(DeviceContext {
            user_agent,
            ip,
            device_id,
        }))
    }
}
