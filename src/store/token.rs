//! Session id generation and hashing.

use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use super::{StoreError, StoreResult};

/// Create a new session id for the cookie: 32 random bytes, base64url.
pub(crate) fn generate_session_id() -> StoreResult<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| StoreError::Entropy)?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session id so raw values never touch the database.
pub(crate) fn hash_session_id(id: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.finalize().to_vec()
}
