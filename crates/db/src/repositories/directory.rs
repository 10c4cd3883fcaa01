//! Postgres-backed implementation of the user-directory seam.

use async_trait::async_trait;

use heartdays_core::directory::{NewUser, UserDirectory, UserRecord};
use heartdays_core::error::AuthError;
use heartdays_core::types::DbId;

use crate::repositories::user_repo::{CreateUser, UserRepo};
use crate::DbPool;

/// [`UserDirectory`] over the `users` table.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: DbPool,
}

impl PgUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Database failures are internal: log the detail, surface a sanitized error.
fn internal(e: sqlx::Error) -> AuthError {
    tracing::error!(error = %e, "User store query failed");
    AuthError::Internal(e.to_string())
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_account(&self, account: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(UserRepo::find_by_account(&self.pool, account)
            .await
            .map_err(internal)?
            .map(Into::into))
    }

    async fn find_active(&self, id: DbId) -> Result<Option<UserRecord>, AuthError> {
        Ok(UserRepo::find_active_by_id(&self.pool, id)
            .await
            .map_err(internal)?
            .map(Into::into))
    }

    async fn account_exists(&self, account: &str) -> Result<bool, AuthError> {
        UserRepo::account_exists(&self.pool, account)
            .await
            .map_err(internal)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        UserRepo::email_exists(&self.pool, email)
            .await
            .map_err(internal)
    }

    async fn insert(&self, input: &NewUser) -> Result<UserRecord, AuthError> {
        let create = CreateUser {
            account: input.account.clone(),
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            roles: input.roles.clone(),
        };
        Ok(UserRepo::create(&self.pool, &create)
            .await
            .map_err(internal)?
            .into())
    }

    async fn deactivate(&self, id: DbId) -> Result<bool, AuthError> {
        UserRepo::deactivate(&self.pool, id).await.map_err(internal)
    }
}
