//! Password hashing.
//!
//! Hashes are argon2id PHC strings (`$argon2id$v=19$...`) with a fresh
//! random salt per hash.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use std::sync::LazyLock;

/// Hash with the same parameters as real ones, checked against when the
/// account does not exist.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("ccms-absent-account").ok());

#[derive(Debug, thiserror::Error)]
#[error("password hashing error: {0}")]
pub struct PasswordError(String);

/// Hash a plaintext password with a random salt.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// Verify a plaintext password against a stored hash.
///
/// Returns `false` for a mismatch and for an unparseable hash.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Run one verification that always fails, costing as much as
/// [`verify_password`] against a stored hash.
pub fn verify_absent(plaintext: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plaintext, hash);
    }
}

/// Whether `value` already is an argon2 hash rather than plaintext.
pub fn is_password_hash(value: &str) -> bool {
    value.starts_with("$argon2")
}
