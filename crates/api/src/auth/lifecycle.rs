//! The session lifecycle controller.
//!
//! Orchestrates credential verification, token minting, session
//! installation, refresh rotation, and logout against the user directory
//! and the session store. Handlers stay thin; everything stateful lives
//! here.

use std::sync::Arc;

use serde::Serialize;

use heartdays_core::device::{parse_device_info, DeviceContext};
use heartdays_core::directory::{UserDirectory, UserRecord};
use heartdays_core::error::AuthError;
use heartdays_core::types::DbId;
use heartdays_store::records::NewSession;
use heartdays_store::session::{SessionStore, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
use heartdays_store::StoreError;

use crate::auth::jwt::{
    generate_refresh_token, generate_session_token, issue_access_token, JwtConfig,
};
use crate::auth::{password, transport};

/// Tokens handed to the client after login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub session_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh-token lifetime in seconds.
    pub refresh_expires_in: u64,
}

/// Session lifecycle operations shared by handlers and background tasks.
#[derive(Clone)]
pub struct SessionLifecycle {
    directory: Arc<dyn UserDirectory>,
    sessions: SessionStore,
    jwt: Arc<JwtConfig>,
    transport_secret: String,
}

fn store_err(e: StoreError) -> AuthError {
    tracing::error!(error = %e, "Session store operation failed");
    AuthError::Internal(e.to_string())
}

impl SessionLifecycle {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        sessions: SessionStore,
        jwt: Arc<JwtConfig>,
        transport_secret: String,
    ) -> Self {
        Self {
            directory,
            sessions,
            jwt,
            transport_secret,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// Verify an account/password pair, where the password arrives
    /// transport-obfuscated.
    ///
    /// Every failure along the way (undecryptable payload, unknown account,
    /// deactivated account, wrong password) collapses to
    /// [`AuthError::InvalidCredentials`]; internal store failures in this
    /// path are masked the same way so they cannot be used as an oracle.
    pub async fn verify_credentials(
        &self,
        account: &str,
        obfuscated_password: &str,
    ) -> Result<UserRecord, AuthError> {
        let plaintext = transport::deobfuscate(obfuscated_password, &self.transport_secret)?;

        let user = match self.directory.find_by_account(account).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthError::InvalidCredentials),
            Err(e) => {
                tracing::error!(error = %e, "User lookup failed during login");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        match password::verify_password(&plaintext, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                tracing::error!(error = %e, user_id = user.id, "Password verification failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Log a user in: verify credentials, mint fresh tokens, and install the
    /// session, superseding any session on another device.
    pub async fn login(
        &self,
        account: &str,
        obfuscated_password: &str,
        device: &DeviceContext,
    ) -> Result<(UserRecord, TokenBundle), AuthError> {
        let user = self.verify_credentials(account, obfuscated_password).await?;

        let device_info = parse_device_info(&device.user_agent, device.ip.clone());
        let bundle = self
            .establish_session(
                &user,
                device.device_id.clone(),
                device.user_agent.clone(),
                Some(device_info),
            )
            .await?;

        tracing::info!(user_id = user.id, account = %user.account, "User logged in");
        Ok((user, bundle))
    }

    /// Rotate a refresh token into a fresh token set.
    ///
    /// Order matters: the token must resolve and pass device binding before
    /// the throttle is consulted, so unknown tokens cannot burn a caller's
    /// attempt budget against an arbitrary user id.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        device: &DeviceContext,
    ) -> Result<(UserRecord, TokenBundle), AuthError> {
        let entry = self
            .sessions
            .validate_refresh_token(refresh_token, &device.user_agent, device.device_id.as_deref())
            .await
            .map_err(store_err)?
            .ok_or(AuthError::RefreshTokenInvalid)?;

        if !self
            .sessions
            .check_refresh_limit(entry.user_id)
            .await
            .map_err(store_err)?
        {
            tracing::warn!(user_id = entry.user_id, "Refresh throttle exceeded");
            return Err(AuthError::TooManyRequests);
        }

        let user = self
            .directory
            .find_active(entry.user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        // The binding data recorded at login carries forward; only the
        // user-agent reflects the current request.
        let bundle = self
            .establish_session(
                &user,
                entry.device_id.clone(),
                device.user_agent.clone(),
                entry.device_info.clone(),
            )
            .await?;

        tracing::info!(user_id = user.id, "Refresh token rotated");
        Ok((user, bundle))
    }

    /// Tear down the user's session. Idempotent.
    pub async fn logout(&self, user_id: DbId) -> Result<(), AuthError> {
        self.sessions
            .invalidate_session(user_id)
            .await
            .map_err(store_err)?;
        tracing::info!(user_id, "User logged out");
        Ok(())
    }

    async fn establish_session(
        &self,
        user: &UserRecord,
        device_id: Option<String>,
        user_agent: String,
        device_info: Option<heartdays_core::device::DeviceInfo>,
    ) -> Result<TokenBundle, AuthError> {
        let session_token = generate_session_token();
        let refresh_token = generate_refresh_token();

        self.sessions
            .force_logout_other_devices(user.id, &session_token)
            .await
            .map_err(store_err)?;

        self.sessions
            .install_session(&NewSession {
                user_id: user.id,
                session_token: session_token.clone(),
                refresh_token: refresh_token.clone(),
                device_id,
                user_agent,
                device_info,
            })
            .await
            .map_err(store_err)?;

        let access_token = issue_access_token(user, &session_token, &self.jwt)?;

        Ok(TokenBundle {
            access_token,
            refresh_token,
            session_token,
            expires_in: ACCESS_TOKEN_TTL.as_secs(),
            refresh_expires_in: REFRESH_TOKEN_TTL.as_secs(),
        })
    }
}
