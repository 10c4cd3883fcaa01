//! HTTP-level integration tests for the auth and session lifecycle
//! endpoints.
//!
//! Tests cover registration, login (with transport-obfuscated passwords),
//! single-device takeover, refresh rotation and replay, the refresh
//! throttle, device binding, logout, and request authentication.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, build_test_app, encrypt_password, get, get_auth, post_json,
    post_json_auth, post_json_ua, seed_user, MemoryDirectory, TEST_JWT_SECRET, TEST_UA,
};
use heartdays_api::auth::jwt::Claims;
use heartdays_core::directory::UserDirectory;
use jsonwebtoken::{encode, EncodingKey, Header};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Log in via the API and return the `data` object containing the token set
/// and user info.
async fn login(
    app: axum::Router,
    account: &str,
    password: &str,
    device_id: Option<&str>,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "account": account,
        "password": encrypt_password(password),
    });
    if let Some(id) = device_id {
        body["device_id"] = serde_json::json!(id);
    }
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

/// Exchange a refresh token via the API, expecting success.
async fn refresh_ok(app: axum::Router, refresh_token: &str) -> serde_json::Value {
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns the full token set and public user info.
#[tokio::test]
async fn test_login_success() {
    let directory = Arc::new(MemoryDirectory::new());
    let (user, password) = seed_user(&directory, "alice").await;
    let app = build_test_app(directory);

    let json = login(app, "alice", &password, None).await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert!(json["session_token"].is_string());
    assert_eq!(json["expires_in"], 7200);
    assert_eq!(json["refresh_expires_in"], 604800);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["account"], "alice");
    assert!(
        json["user"].get("password_hash").is_none(),
        "password hash must never be serialized"
    );
}

/// Wrong password and unknown account fail identically.
#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let directory = Arc::new(MemoryDirectory::new());
    seed_user(&directory, "bob").await;
    let app = build_test_app(directory);

    let wrong_pw = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "account": "bob", "password": encrypt_password("incorrect") }),
    )
    .await;
    let unknown = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "account": "ghost", "password": encrypt_password("whatever") }),
    )
    .await;

    assert_eq!(wrong_pw.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let a = body_json(wrong_pw).await;
    let b = body_json(unknown).await;
    assert_eq!(a["code"], "INVALID_CREDENTIALS");
    assert_eq!(a, b, "failure responses must be identical");
}

/// A deactivated account fails with the same generic 401.
#[tokio::test]
async fn test_login_inactive_account() {
    let directory = Arc::new(MemoryDirectory::new());
    let (user, password) = seed_user(&directory, "dormant").await;
    directory
        .deactivate(user.id)
        .await
        .expect("deactivation should succeed");
    let app = build_test_app(directory);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "account": "dormant", "password": encrypt_password(&password) }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS").await;
}

/// A password sent in the clear (not transport-obfuscated) is rejected like
/// a wrong password.
#[tokio::test]
async fn test_login_plaintext_password_rejected() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "carol").await;
    let app = build_test_app(directory);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "account": "carol", "password": password }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS").await;
}

// ---------------------------------------------------------------------------
// Single-device enforcement
// ---------------------------------------------------------------------------

/// A second login supersedes the first device's session entirely.
#[tokio::test]
async fn test_second_login_supersedes_first_device() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "dave").await;
    let app = build_test_app(directory);

    let first = login(app.clone(), "dave", &password, None).await;
    let second = login(app.clone(), "dave", &password, None).await;

    // The first device's access token no longer authenticates.
    let response = get_auth(
        app.clone(),
        "/api/v1/auth/me",
        first["access_token"].as_str().unwrap(),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "SESSION_INVALID").await;

    // Its refresh token is dead too.
    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": first["refresh_token"] }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID").await;

    // The second device is unaffected.
    let response = get_auth(
        app,
        "/api/v1/auth/me",
        second["access_token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Refresh rotation
// ---------------------------------------------------------------------------

/// Refresh rotates the whole token set and kills the previous one.
#[tokio::test]
async fn test_refresh_rotation_and_replay() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "erin").await;
    let app = build_test_app(directory);

    let initial = login(app.clone(), "erin", &password, None).await;
    let old_refresh = initial["refresh_token"].as_str().unwrap();

    let rotated = refresh_ok(app.clone(), old_refresh).await;
    assert_ne!(rotated["refresh_token"], initial["refresh_token"]);
    assert_ne!(rotated["access_token"], initial["access_token"]);
    assert_eq!(rotated["user"]["account"], "erin");

    // Replaying the consumed refresh token fails.
    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID").await;

    // The pre-rotation access token is superseded.
    let response = get_auth(
        app.clone(),
        "/api/v1/auth/me",
        initial["access_token"].as_str().unwrap(),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "SESSION_INVALID").await;

    // The fresh access token works.
    let response = get_auth(
        app,
        "/api/v1/auth/me",
        rotated["access_token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// A refresh token nobody issued is rejected without consuming anything.
#[tokio::test]
async fn test_refresh_unknown_token() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = build_test_app(directory);

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": "f".repeat(64) }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID").await;
}

/// The fourth refresh attempt inside the window is throttled with 429.
#[tokio::test]
async fn test_refresh_throttle() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "frank").await;
    let app = build_test_app(directory);

    let mut tokens = login(app.clone(), "frank", &password, None).await;
    for _ in 0..3 {
        let refresh_token = tokens["refresh_token"].as_str().unwrap().to_string();
        tokens = refresh_ok(app.clone(), &refresh_token).await;
    }

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": tokens["refresh_token"] }),
    )
    .await;
    assert_error(response, StatusCode::TOO_MANY_REQUESTS, "TOO_MANY_REQUESTS").await;
}

// ---------------------------------------------------------------------------
// Device binding
// ---------------------------------------------------------------------------

/// A refresh from a different device id is rejected even when the
/// user-agent matches.
#[tokio::test]
async fn test_refresh_device_id_mismatch() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "grace").await;
    let app = build_test_app(directory);

    let tokens = login(app.clone(), "grace", &password, Some("device-a")).await;

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({
            "refresh_token": tokens["refresh_token"],
            "device_id": "device-b",
        }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID").await;
}

/// With a matching device id, a changed user-agent does not block refresh.
#[tokio::test]
async fn test_refresh_device_id_overrides_user_agent() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "heidi").await;
    let app = build_test_app(directory);

    let tokens = login(app.clone(), "heidi", &password, Some("device-a")).await;

    let response = post_json_ua(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({
            "refresh_token": tokens["refresh_token"],
            "device_id": "device-a",
        }),
        "SomeOther/2.0 (upgraded client)",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Without a device id, the user-agent is the binding: a different agent
/// cannot use the refresh token.
#[tokio::test]
async fn test_refresh_user_agent_fallback_binding() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "ivan").await;
    let app = build_test_app(directory);

    let tokens = login(app.clone(), "ivan", &password, None).await;

    let response = post_json_ua(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": tokens["refresh_token"] }),
        "Stolen/1.0 (different browser)",
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID").await;
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// Logout tears the session down; every token stops working.
#[tokio::test]
async fn test_logout_invalidates_everything() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "judy").await;
    let app = build_test_app(directory);

    let tokens = login(app.clone(), "judy", &password, None).await;
    let access = tokens["access_token"].as_str().unwrap();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/auth/logout",
        serde_json::json!({}),
        access,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), "/api/v1/auth/me", access).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "SESSION_INVALID").await;

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": tokens["refresh_token"] }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID").await;
}

// ---------------------------------------------------------------------------
// Request authentication
// ---------------------------------------------------------------------------

/// Missing and malformed Authorization headers report TOKEN_MISSING.
#[tokio::test]
async fn test_missing_bearer_token() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = build_test_app(directory);

    let response = get(app.clone(), "/api/v1/auth/me").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "TOKEN_MISSING").await;

    let response = get_auth(app, "/api/v1/auth/me", "").await;
    // "Bearer " prefix present but empty token decodes as invalid.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// An expired token is reported as TOKEN_EXPIRED, distinct from tampering.
#[tokio::test]
async fn test_expired_token() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = build_test_app(directory);

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: 1,
        account: "kate".to_string(),
        roles: vec!["user".to_string()],
        session_token: "some-session".to_string(),
        exp: now - 300,
        iat: now - 7500,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encoding should succeed");

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED").await;
}

/// A tampered token is reported as TOKEN_INVALID.
#[tokio::test]
async fn test_tampered_token() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "leo").await;
    let app = build_test_app(directory);

    let tokens = login(app.clone(), "leo", &password, None).await;
    let mut tampered = tokens["access_token"].as_str().unwrap().to_string();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = get_auth(app, "/api/v1/auth/me", &tampered).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "TOKEN_INVALID").await;
}

/// A well-signed token with no embedded session token is unusable.
#[tokio::test]
async fn test_token_without_session() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = build_test_app(directory);

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: 1,
        account: "mia".to_string(),
        roles: vec!["user".to_string()],
        session_token: String::new(),
        exp: now + 3600,
        iat: now,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encoding should succeed");

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "TOKEN_MISSING_SESSION").await;
}

// ---------------------------------------------------------------------------
// Session and user inspection
// ---------------------------------------------------------------------------

/// GET /auth/session shows the caller's session and device fingerprint.
#[tokio::test]
async fn test_session_endpoint() {
    let directory = Arc::new(MemoryDirectory::new());
    let (_user, password) = seed_user(&directory, "nina").await;
    let app = build_test_app(directory);

    let tokens = login(app.clone(), "nina", &password, None).await;
    let response = get_auth(
        app,
        "/api/v1/auth/session",
        tokens["access_token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["session"]["session_token"], tokens["session_token"]);
    assert_eq!(json["data"]["session"]["user_agent"], TEST_UA);
    assert_eq!(json["data"]["logged_in_elsewhere"], false);
    assert_eq!(
        json["data"]["session"]["device_info"]["device_type"],
        "desktop"
    );
}

/// GET /auth/me reflects the directory and 404s once deactivated.
#[tokio::test]
async fn test_me_endpoint() {
    let directory = Arc::new(MemoryDirectory::new());
    let (user, password) = seed_user(&directory, "oscar").await;
    let app = build_test_app(directory.clone());

    let tokens = login(app.clone(), "oscar", &password, None).await;
    let access = tokens["access_token"].as_str().unwrap();

    let response = get_auth(app.clone(), "/api/v1/auth/me", access).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["account"], "oscar");
    assert_eq!(json["data"]["roles"], serde_json::json!(["user"]));

    directory
        .deactivate(user.id)
        .await
        .expect("deactivation should succeed");
    let response = get_auth(app, "/api/v1/auth/me", access).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Register, then log in with the new credentials.
#[tokio::test]
async fn test_register_and_login() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = build_test_app(directory);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        serde_json::json!({
            "account": "pam",
            "email": "pam@test.com",
            "password": encrypt_password("a-solid-password"),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["account"], "pam");
    assert!(
        json["data"]["name"].as_str().unwrap().starts_with("user_"),
        "a display name is generated when absent"
    );

    let tokens = login(app, "pam", "a-solid-password", None).await;
    assert!(tokens["access_token"].is_string());
}

/// Registration validates its inputs and rejects duplicates.
#[tokio::test]
async fn test_register_validation() {
    let directory = Arc::new(MemoryDirectory::new());
    seed_user(&directory, "taken").await;
    let app = build_test_app(directory);

    let cases = [
        serde_json::json!({
            "account": "", "email": "x@test.com",
            "password": encrypt_password("long-enough"),
        }),
        serde_json::json!({
            "account": "quentin", "email": "not-an-email",
            "password": encrypt_password("long-enough"),
        }),
        serde_json::json!({
            "account": "quentin", "email": "q@test.com",
            "password": encrypt_password("tiny"),
        }),
        serde_json::json!({
            "account": "taken", "email": "other@test.com",
            "password": encrypt_password("long-enough"),
        }),
        serde_json::json!({
            "account": "quentin", "email": "taken@test.com",
            "password": encrypt_password("long-enough"),
        }),
    ];

    for body in cases {
        let response = post_json(app.clone(), "/api/v1/auth/register", body.clone()).await;
        assert_error(response, StatusCode::BAD_REQUEST, "PARAMS_ERROR").await;
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// The health endpoint reports ok with no database configured.
#[tokio::test]
async fn test_health() {
    let directory = Arc::new(MemoryDirectory::new());
    let app = build_test_app(directory);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], serde_json::Value::Null);
}
