//! Credential and session persistence.
//!
//! The gate only talks to the two traits defined here. `PgSessionStore` and
//! `PgCredentialStore` back a deployment; the in-memory pair is used by tests
//! and by callers embedding the router.
//!
//! Expiry is enforced twice: `get` never returns a record whose `expires_at`
//! has passed, and a background sweeper deletes such records to bound storage.
//! A failed or late sweep therefore never makes an expired session valid.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub mod memory;
pub mod password;
pub mod postgres;
pub mod sweeper;
mod token;

pub use memory::{MemoryCredentialStore, MemorySessionStore};
pub use postgres::{PgCredentialStore, PgSessionStore};

/// How many fresh ids `create` tries before giving up on a key collision.
pub(crate) const SESSION_ID_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to generate session id")]
    Entropy,
    #[error("failed to allocate a unique session id")]
    IdExhausted,
    #[error("invalid stored password hash")]
    InvalidHash,
    #[error("session expiry out of range")]
    ExpiryOutOfRange,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal reference to an authenticated user, fixed at session creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub identity: Identity,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is live strictly before `expires_at`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Stored credentials for one user. The hash never leaves the server.
#[derive(Clone, Debug)]
pub struct CredentialRecord {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
}

impl CredentialRecord {
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            username: self.username.clone(),
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session for `identity` under a freshly generated id.
    async fn create(&self, identity: Identity) -> StoreResult<Session>;

    /// Return the session only if it exists and has not expired.
    async fn get(&self, id: &str) -> StoreResult<Option<Session>>;

    /// Push the expiry of a live session to `now + ttl`. Returns `false` when
    /// the session is missing or already expired.
    async fn touch(&self, id: &str) -> StoreResult<bool>;

    /// Remove a session. Removing an unknown id is not an error.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Delete every expired record and return how many were removed.
    async fn sweep(&self) -> StoreResult<usize>;

    /// Cheap availability probe for health checks.
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<CredentialRecord>>;

    /// All users ordered by `user_id`.
    async fn list_users(&self) -> StoreResult<Vec<Identity>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn session_is_dead_at_its_expiry() {
        let now = Utc::now();
        let session = Session {
            id: "id".to_string(),
            identity: Identity {
                user_id: 1,
                username: "bob".to_string(),
            },
            created_at: now,
            expires_at: now + TimeDelta::seconds(10),
        };
        assert!(session.is_live_at(now));
        assert!(!session.is_live_at(session.expires_at));
        assert!(!session.is_live_at(session.expires_at + TimeDelta::seconds(1)));
    }

    #[test]
    fn credential_record_identity_drops_hash() {
        let record = CredentialRecord {
            user_id: 7,
            username: "alice".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };
        assert_eq!(
            record.identity(),
            Identity {
                user_id: 7,
                username: "alice".to_string()
            }
        );
    }
}
