//! Session key-space constructors.
//!
//! Four logical key spaces hold the denormalized session state, plus the
//! refresh throttle counter and the presence marker. All keys are built
//! here; nothing else in the codebase formats these strings.

use heartdays_core::types::DbId;

/// `session:{user_id}` -- the user's single live session record.
pub fn session(user_id: DbId) -> String {
    format!("session:{user_id}")
}

/// `token:{session_token}` -- access-token mapping, consulted on every
/// authenticated request.
pub fn access_token(session_token: &str) -> String {
    format!("token:{session_token}")
}

/// `refresh_token:{refresh_token}` -- the canonical refresh mapping.
pub fn refresh_token(refresh_token: &str) -> String {
    format!("refresh_token:{refresh_token}")
}

/// `user_refresh_token:{user_id}` -- pointer to the user's current refresh
/// token, used to evict the previous mapping on rotation.
pub fn user_refresh_pointer(user_id: DbId) -> String {
    format!("user_refresh_token:{user_id}")
}

/// `refresh_limit:{user_id}` -- refresh attempt counter (60 s window).
pub fn refresh_limit(user_id: DbId) -> String {
    format!("refresh_limit:{user_id}")
}

/// `online:user:{user_id}` -- last-seen presence marker (10 min TTL).
pub fn presence(user_id: DbId) -> String {
    format!("online:user:{user_id}")
}
