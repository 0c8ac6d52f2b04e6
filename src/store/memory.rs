//! In-memory stores.
//!
//! Sessions live in a `HashMap` behind a `tokio::sync::RwLock`; nothing
//! survives a restart. Not meant for multi-instance deployments.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use std::collections::{HashMap, hash_map::Entry};
use tokio::sync::RwLock;

use super::{
    CredentialRecord, CredentialStore, Identity, SESSION_ID_ATTEMPTS, Session, SessionStore,
    StoreError, StoreResult, token::generate_session_id,
};

#[derive(Debug)]
pub struct MemorySessionStore {
    ttl: TimeDelta,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records held, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, identity: Identity) -> StoreResult<Session> {
        for _ in 0..SESSION_ID_ATTEMPTS {
            let id = generate_session_id()?;
            let created_at = Utc::now();
            let expires_at = created_at
                .checked_add_signed(self.ttl)
                .ok_or(StoreError::ExpiryOutOfRange)?;
            let session = Session {
                id: id.clone(),
                identity: identity.clone(),
                created_at,
                expires_at,
            };

            let mut sessions = self.sessions.write().await;
            if let Entry::Vacant(slot) = sessions.entry(id) {
                slot.insert(session.clone());
                return Ok(session);
            }
        }

        Err(StoreError::IdExhausted)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Session>> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                None => return Ok(None),
                Some(session) if session.is_live_at(now) => return Ok(Some(session.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it now instead of waiting for the sweeper. Re-check
        // under the write lock, a concurrent touch may have won the race.
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(id)
            .is_some_and(|session| !session.is_live_at(now))
        {
            sessions.remove(id);
        }
        Ok(None)
    }

    async fn touch(&self, id: &str) -> StoreResult<bool> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if session.is_live_at(now) => {
                session.expires_at = now
                    .checked_add_signed(self.ttl)
                    .ok_or(StoreError::ExpiryOutOfRange)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn sweep(&self) -> StoreResult<usize> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_live_at(now));
        Ok(before - sessions.len())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Fixed set of users, keyed by username.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: HashMap<String, CredentialRecord>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        Self {
            users: records
                .into_iter()
                .map(|record| (record.username.clone(), record))
                .collect(),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<CredentialRecord>> {
        Ok(self.users.get(username).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<Identity>> {
        let mut users: Vec<Identity> = self
            .users
            .values()
            .map(CredentialRecord::identity)
            .collect();
        users.sort_by_key(|identity| identity.user_id);
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    fn bob() -> Identity {
        Identity {
            user_id: 1,
            username: "bob".to_string(),
        }
    }

    fn live_session(id: &str) -> Session {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            identity: bob(),
            created_at: now,
            expires_at: now + TimeDelta::hours(1),
        }
    }

    fn expired_session(id: &str) -> Session {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            identity: bob(),
            created_at: now - TimeDelta::hours(2),
            expires_at: now - TimeDelta::hours(1),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_identity() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::hours(1));
        let session = store.create(bob()).await?;
        assert_eq!(session.expires_at - session.created_at, TimeDelta::hours(1));

        let found = store.get(&session.id).await?.context("session missing")?;
        assert_eq!(found.identity, bob());
        assert_eq!(found, session);
        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_id_is_absent() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::hours(1));
        assert!(store.get("never-issued").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn expired_session_is_absent_and_dropped() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::hours(1));
        store.insert_raw(expired_session("old")).await;
        assert_eq!(store.len().await, 1);

        assert!(store.get("old").await?.is_none());
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn session_expires_after_ttl() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::milliseconds(50));
        let session = store.create(bob()).await?;
        assert!(store.get(&session.id).await?.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(store.get(&session.id).await?.is_none());
        // A later sweep must not bring it back.
        store.sweep().await?;
        assert!(store.get(&session.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn zero_ttl_sessions_are_never_live() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::zero());
        let session = store.create(bob()).await?;
        assert!(store.get(&session.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn oversized_ttl_is_an_error_not_a_panic() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::MAX);
        assert!(matches!(
            store.create(bob()).await,
            Err(StoreError::ExpiryOutOfRange)
        ));
        assert!(store.is_empty().await);

        store.insert_raw(live_session("live")).await;
        assert!(matches!(
            store.touch("live").await,
            Err(StoreError::ExpiryOutOfRange)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn sweep_removes_only_expired() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::hours(1));
        let live = store.create(bob()).await?;
        store.insert_raw(expired_session("old-1")).await;
        store.insert_raw(expired_session("old-2")).await;

        assert_eq!(store.sweep().await?, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.get(&live.id).await?.is_some());
        assert_eq!(store.sweep().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_idempotent() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::hours(1));
        let session = store.create(bob()).await?;
        store.delete(&session.id).await?;
        store.delete(&session.id).await?;
        store.delete("never-issued").await?;
        assert!(store.get(&session.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn touch_extends_live_session() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::hours(1));
        let session = store.create(bob()).await?;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(store.touch(&session.id).await?);
        let touched = store.get(&session.id).await?.context("session missing")?;
        assert!(touched.expires_at > session.expires_at);
        assert_eq!(touched.created_at, session.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn touch_does_not_revive_expired_session() -> Result<()> {
        let store = MemorySessionStore::new(TimeDelta::hours(1));
        store.insert_raw(expired_session("old")).await;

        assert!(!store.touch("old").await?);
        assert!(!store.touch("never-issued").await?);
        assert!(store.get("old").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_yield_distinct_ids() -> Result<()> {
        let store = Arc::new(MemorySessionStore::new(TimeDelta::hours(1)));
        let mut handles = Vec::new();
        for _ in 0..64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.create(bob()).await }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await??.id);
        }
        assert_eq!(ids.len(), 64);
        assert_eq!(store.len().await, 64);
        Ok(())
    }

    #[tokio::test]
    async fn sweep_racing_get_never_returns_expired() -> Result<()> {
        let store = Arc::new(MemorySessionStore::new(TimeDelta::hours(1)));
        for index in 0..32 {
            store.insert_raw(expired_session(&format!("old-{index}"))).await;
        }

        let sweeper = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.sweep().await })
        };
        for index in 0..32 {
            assert!(store.get(&format!("old-{index}")).await?.is_none());
            store.delete(&format!("old-{index}")).await?;
        }
        sweeper.await??;
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn credential_lookup_and_listing() -> Result<()> {
        let store = MemoryCredentialStore::new([
            CredentialRecord {
                user_id: 2,
                username: "alice".to_string(),
                password_hash: "hash-a".to_string(),
            },
            CredentialRecord {
                user_id: 1,
                username: "bob".to_string(),
                password_hash: "hash-b".to_string(),
            },
        ]);

        let record = store
            .find_by_username("bob")
            .await?
            .context("bob missing")?;
        assert_eq!(record.user_id, 1);
        assert!(store.find_by_username("carol").await?.is_none());

        let users = store.list_users().await?;
        assert_eq!(
            users.iter().map(|u| u.user_id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        Ok(())
    }
}
