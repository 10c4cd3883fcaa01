//! Shared test harness: an in-memory user directory, the full application
//! router with the production middleware stack, and request helpers.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::RwLock;
use tower::ServiceExt;

use heartdays_api::auth::jwt::JwtConfig;
use heartdays_api::auth::{password, transport};
use heartdays_api::config::ServerConfig;
use heartdays_api::router::build_app_router;
use heartdays_api::state::AppState;
use heartdays_core::directory::{NewUser, UserDirectory, UserRecord};
use heartdays_core::error::AuthError;
use heartdays_core::types::DbId;
use heartdays_store::{MemoryStore, SessionStore};

pub const TEST_JWT_SECRET: &str = "integration-test-jwt-secret";
pub const TEST_TRANSPORT_SECRET: &str = "integration-test-transport-secret";
pub const TEST_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) TestClient/1.0";

/// In-memory [`UserDirectory`] so tests need no database.
#[derive(Default)]
pub struct MemoryDirectory {
    users: RwLock<Vec<UserRecord>>,
    next_id: AtomicI64,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_account(&self, account: &str) -> Result<Option<UserRecord>, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.account == account).cloned())
    }

    async fn find_active(&self, id: DbId) -> Result<Option<UserRecord>, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id && u.is_active).cloned())
    }

    async fn account_exists(&self, account: &str) -> Result<bool, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.account == account))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn insert(&self, input: &NewUser) -> Result<UserRecord, AuthError> {
        let record = UserRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            account: input.account.clone(),
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            roles: input.roles.clone(),
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        self.users.write().await.push(record.clone());
        Ok(record)
    }

    async fn deactivate(&self, id: DbId) -> Result<bool, AuthError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id && u.is_active) {
            Some(user) => {
                user.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Build a test `ServerConfig` with known secrets and safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        transport_secret: TEST_TRANSPORT_SECRET.to_string(),
    }
}

/// Build the full application router with all middleware layers, backed by
/// the given in-memory directory and a fresh session store.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(directory: Arc<MemoryDirectory>) -> Router {
    let config = test_config();
    let sessions = SessionStore::new(Arc::new(MemoryStore::new()));
    let state = AppState::new(None, Arc::new(config.clone()), directory, sessions);
    build_app_router(state, &config)
}

/// Seed a user directly into the directory, returning the record and the
/// plaintext password used.
pub async fn seed_user(directory: &MemoryDirectory, account: &str) -> (UserRecord, String) {
    seed_user_with_roles(directory, account, &["user"]).await
}

/// Seed a user with an explicit role set.
pub async fn seed_user_with_roles(
    directory: &MemoryDirectory,
    account: &str,
    roles: &[&str],
) -> (UserRecord, String) {
    let plaintext = "test_password_123!";
    let user = directory
        .insert(&NewUser {
            account: account.to_string(),
            name: format!("Test {account}"),
            email: format!("{account}@test.com"),
            password_hash: password::hash_password(plaintext).expect("hashing should succeed"),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        })
        .await
        .expect("seeding should succeed");
    (user, plaintext.to_string())
}

/// Obfuscate a plaintext password the way a client would before login.
pub fn encrypt_password(plaintext: &str) -> String {
    transport::obfuscate(plaintext, TEST_TRANSPORT_SECRET).expect("encryption should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// GET `path` without authentication.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("user-agent", TEST_UA)
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// GET `path` with a bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("user-agent", TEST_UA)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// POST a JSON body to `path` without authentication.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    post_json_ua(app, path, body, TEST_UA).await
}

/// POST a JSON body with a caller-chosen user-agent string.
pub async fn post_json_ua(
    app: Router,
    path: &str,
    body: serde_json::Value,
    user_agent: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("user-agent", user_agent)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// POST a JSON body with a bearer token.
pub async fn post_json_auth(
    app: Router,
    path: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("user-agent", TEST_UA)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should not fail")
}

/// Consume a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Assert an error response: given status, given machine-readable code.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error code: {json}");
}
