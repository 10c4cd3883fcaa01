//! The user-store collaborator seam.
//!
//! Credential records are owned by an external relational store; this
//! subsystem only reads them (existence/active checks, password hash) plus a
//! single insert for registration. The trait keeps the session core testable
//! without a live database.

use async_trait::async_trait;

use crate::error::AuthError;
use crate::types::{DbId, Timestamp};

/// A user credential record as read from the user store.
///
/// Contains the password hash -- never serialize this to API responses.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: DbId,
    /// Login identifier (account name).
    pub account: String,
    /// Display name.
    pub name: String,
    pub email: String,
    /// Argon2id PHC-formatted hash.
    pub password_hash: String,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// Input for registering a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub account: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

/// Read-mostly access to the external user store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by account name, active or not.
    async fn find_by_account(&self, account: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Find a user by id, returning `None` when missing **or deactivated**.
    async fn find_active(&self, id: DbId) -> Result<Option<UserRecord>, AuthError>;

    /// Whether any user (active or not) already owns this account name.
    async fn account_exists(&self, account: &str) -> Result<bool, AuthError>;

    /// Whether any user (active or not) already registered this email.
    async fn email_exists(&self, email: &str) -> Result<bool, AuthError>;

    /// Insert a new user, returning the stored record.
    async fn insert(&self, input: &NewUser) -> Result<UserRecord, AuthError>;

    /// Deactivate a user. Returns `false` when the user is missing or
    /// already inactive.
    async fn deactivate(&self, id: DbId) -> Result<bool, AuthError>;
}
