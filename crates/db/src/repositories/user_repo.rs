//! Repository for the `users` table.

use sqlx::PgPool;

use heartdays_core::types::DbId;

use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, account, name, email, password_hash, roles, is_active, created_at, updated_at";

/// Input for inserting a new user row.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub account: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

/// Provides read/insert operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by account name, active or not.
    pub async fn find_by_account(pool: &PgPool, account: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE account = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(account)
            .fetch_optional(pool)
            .await
    }

    /// Find an active user by id. Deactivated users are treated as absent.
    pub async fn find_active_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether any user row owns this account name.
    pub async fn account_exists(pool: &PgPool, account: &str) -> Result<bool, sqlx::Error> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE account = $1)")
                .bind(account)
                .fetch_one(pool)
                .await?;
        Ok(exists.0)
    }

    /// Whether any user row registered this email.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
        Ok(exists.0)
    }

    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (account, name, email, password_hash, roles)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.account)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.roles)
            .fetch_one(pool)
            .await
    }

    /// Deactivate a user. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = false, updated_at = NOW()
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
