//! User entity model.

use sqlx::FromRow;

use heartdays_core::directory::UserRecord;
use heartdays_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- never serialize this to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub account: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserRecord {
    fn from(u: User) -> Self {
        UserRecord {
            id: u.id,
            account: u.account,
            name: u.name,
            email: u.email,
            password_hash: u.password_hash,
            roles: u.roles,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}
