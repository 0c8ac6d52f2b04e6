//! Argon2id password hashing and verification.
//!
//! Stored hashes are PHC strings (`$argon2id$v=19$...`). A hash that does not
//! parse is reported as [`StoreError::InvalidHash`] so a corrupt row is not
//! mistaken for a wrong password.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::{StoreError, StoreResult};

/// Hash a password with a random salt. Returns a PHC string.
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| StoreError::InvalidHash)
}

/// Check `password` against a PHC hash.
pub fn verify_password(password: &str, hash: &str) -> StoreResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|_| StoreError::InvalidHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
