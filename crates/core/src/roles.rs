//! Well-known role names.
//!
//! Roles are stored as a set of strings per user (`roles TEXT[]` in the user
//! store, `roles: Vec<String>` in JWT claims).

/// Full administrative access.
pub const ROLE_ADMIN: &str = "admin";

/// Default role assigned on registration.
pub const ROLE_USER: &str = "user";
