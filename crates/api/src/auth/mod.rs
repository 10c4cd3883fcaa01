//! Authentication primitives and the session lifecycle controller.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`transport`] -- AES-256-GCM de-obfuscation of login passwords.
//! - [`jwt`] -- signed access tokens and opaque session/refresh tokens.
//! - [`lifecycle`] -- login, refresh, logout, single-device takeover.

pub mod jwt;
pub mod lifecycle;
pub mod password;
pub mod transport;
