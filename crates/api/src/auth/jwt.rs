//! Token issuance and verification.
//!
//! Access tokens are HS256-signed JWTs embedding the opaque session token.
//! Session and refresh tokens are opaque random strings with independent
//! derivations: knowing one gives no handle on the other. Decoding checks
//! signature and expiry only -- whether the session is still *live* is the
//! request authenticator's job, against the session store.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use heartdays_core::directory::UserRecord;
use heartdays_core::error::AuthError;
use heartdays_core::types::DbId;
use heartdays_store::session::ACCESS_TOKEN_TTL;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Login account name.
    pub account: String,
    /// The user's role set.
    pub roles: Vec<String>,
    /// Opaque session token; resolved against the session store per request.
    pub session_token: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for JWT signing and verification.
///
/// Token lifetimes are fixed by the session store
/// (`heartdays_store::session`); only the secret is configurable.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
}

impl JwtConfig {
    /// Load from the `JWT_SECRET` environment variable.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");
        Self { secret }
    }
}

/// Generate an opaque session token (UUID v4).
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

/// Generate an opaque refresh token: 32 random bytes, hex-encoded.
///
/// Derived independently of the session token.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Sign an access token for the given user, embedding the session token.
pub fn issue_access_token(
    user: &UserRecord,
    session_token: &str,
    config: &JwtConfig,
) -> Result<String, AuthError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        account: user.account.clone(),
        roles: user.roles.clone(),
        session_token: session_token.to_string(),
        exp: now + ACCESS_TOKEN_TTL.as_secs() as i64,
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))
}

/// Verify signature and expiry of an access token and return its claims.
///
/// Expiry is reported as [`AuthError::TokenExpired`], every other failure as
/// [`AuthError::TokenInvalid`] -- clients react differently to the two.
/// Does NOT consult the session store.
pub fn decode_access_token(token: &str, config: &JwtConfig) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    })
}
