//! Transport-layer password obfuscation.
//!
//! Login requests carry the password AES-256-GCM-encrypted under a shared
//! secret rather than in the clear. This is obfuscation against casual
//! inspection, not a substitute for TLS. The wire format is
//! `hex(nonce) || hex(ciphertext + tag)` with a 12-byte nonce.
//!
//! Every decryption failure collapses to [`AuthError::InvalidCredentials`]
//! so a malformed payload is indistinguishable from a wrong password.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};

use heartdays_core::error::AuthError;

const NONCE_LEN: usize = 12;

fn cipher_for(secret: &str) -> Aes256Gcm {
    let key = Sha256::digest(secret.as_bytes());
    Aes256Gcm::new_from_slice(&key).expect("SHA-256 digest is a valid AES-256 key")
}

/// Encrypt a plaintext password for transport. Used by tests and client
/// tooling; the server only ever decrypts.
pub fn obfuscate(plaintext: &str, secret: &str) -> Result<String, AuthError> {
    let cipher = cipher_for(secret);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| AuthError::Internal("Password encryption failed".to_string()))?;

    Ok(format!(
        "{}{}",
        hex::encode(nonce_bytes),
        hex::encode(ciphertext)
    ))
}

/// Decrypt a transport-obfuscated password payload.
pub fn deobfuscate(payload: &str, secret: &str) -> Result<String, AuthError> {
    // Nonce is 12 bytes = 24 hex chars; the GCM tag alone adds 16 bytes more.
    if !payload.is_ascii() || payload.len() <= NONCE_LEN * 2 {
        return Err(AuthError::InvalidCredentials);
    }
    let (nonce_hex, ct_hex) = payload.split_at(NONCE_LEN * 2);

    let nonce_bytes = hex::decode(nonce_hex).map_err(|_| AuthError::InvalidCredentials)?;
    let ciphertext = hex::decode(ct_hex).map_err(|_| AuthError::InvalidCredentials)?;

    let cipher = cipher_for(secret);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| AuthError::InvalidCredentials)?;

    String::from_utf8(plaintext).map_err(|_| AuthError::InvalidCredentials)
}
