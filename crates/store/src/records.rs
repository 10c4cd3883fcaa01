//! Typed records held under the session key spaces.

use serde::{Deserialize, Serialize};

use heartdays_core::device::DeviceInfo;
use heartdays_core::types::{DbId, Timestamp};

/// The user's single live session, stored under `session:{user_id}`.
///
/// Replaced whole on login and refresh, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    pub created_at: Timestamp,
}

/// Access-token mapping stored under `token:{session_token}` with the
/// access-token lifetime. Allows O(1) validation of a presented session
/// token without trusting the signed token's claims alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenEntry {
    pub user_id: DbId,
    pub session_token: String,
    pub refresh_token: String,
}

/// Refresh mapping stored under `refresh_token:{token}` with the
/// refresh-token lifetime. The canonical object rotated on each refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenEntry {
    pub user_id: DbId,
    pub session_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    pub created_at: Timestamp,
}

/// Everything needed to install a fresh session for a user.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: DbId,
    pub session_token: String,
    pub refresh_token: String,
    pub device_id: Option<String>,
    pub user_agent: String,
    pub device_info: Option<DeviceInfo>,
}
