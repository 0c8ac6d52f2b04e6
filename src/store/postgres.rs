//! PostgreSQL-backed stores.
//!
//! Sessions are keyed by the SHA-256 of the session id; the raw id only ever
//! exists in the cookie and in the `Session` handed back to the caller.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{Instrument, debug, info_span};

use super::{
    CredentialRecord, CredentialStore, Identity, SESSION_ID_ATTEMPTS, Session, SessionStore,
    StoreError, StoreResult,
    token::{generate_session_id, hash_session_id},
};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Split the bundled schema into executable statements, dropping comments.
fn schema_statements() -> Vec<String> {
    let without_comments = SCHEMA_SQL
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    without_comments
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone, Debug)]
pub struct PgSessionStore {
    pool: PgPool,
    ttl: TimeDelta,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool, ttl: TimeDelta) -> Self {
        Self { pool, ttl }
    }

    /// Create the `users` and `sessions` tables when missing.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in schema_statements() {
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "CREATE",
                db.statement = statement.as_str()
            );
            sqlx::query(&statement)
                .execute(&self.pool)
                .instrument(span)
                .await?;
        }
        Ok(())
    }
}

fn session_from_row(id: &str, row: &PgRow) -> StoreResult<Session> {
    Ok(Session {
        id: id.to_string(),
        identity: Identity {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
        },
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        expires_at: row.try_get::<DateTime<Utc>, _>("expires_at")?,
    })
}

fn identity_from_row(row: &PgRow) -> StoreResult<Identity> {
    Ok(Identity {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
    })
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, identity: Identity) -> StoreResult<Session> {
        // Both timestamps come from the database clock, the same one `get` compares against.
        let query = r"
            INSERT INTO sessions (sid, user_id, username, created_at, expires_at)
            VALUES ($1, $2, $3, NOW(), NOW() + ($4 * INTERVAL '1 millisecond'))
            RETURNING created_at, expires_at
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        for _ in 0..SESSION_ID_ATTEMPTS {
            let id = generate_session_id()?;
            let result = sqlx::query(query)
                .bind(hash_session_id(&id))
                .bind(identity.user_id)
                .bind(&identity.username)
                .bind(self.ttl.num_milliseconds())
                .fetch_one(&self.pool)
                .instrument(span.clone())
                .await;

            match result {
                Ok(row) => {
                    return Ok(Session {
                        id,
                        identity,
                        created_at: row.try_get("created_at")?,
                        expires_at: row.try_get("expires_at")?,
                    });
                }
                Err(err) if is_unique_violation(&err) => {
                    debug!("session id collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(StoreError::IdExhausted)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Session>> {
        // The expiry predicate lives in the query so an unswept row is never returned.
        let query = r"
            SELECT user_id, username, created_at, expires_at
            FROM sessions
            WHERE sid = $1
              AND expires_at > NOW()
            LIMIT 1
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(hash_session_id(id))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        row.map(|row| session_from_row(id, &row)).transpose()
    }

    async fn touch(&self, id: &str) -> StoreResult<bool> {
        let query = r"
            UPDATE sessions
            SET expires_at = NOW() + ($2 * INTERVAL '1 millisecond')
            WHERE sid = $1
              AND expires_at > NOW()
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(hash_session_id(id))
            .bind(self.ttl.num_milliseconds())
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        // Idempotent; it's fine if no rows are deleted.
        let query = "DELETE FROM sessions WHERE sid = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(hash_session_id(id))
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn sweep(&self) -> StoreResult<usize> {
        let query = "DELETE FROM sessions WHERE expires_at <= NOW()";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn ping(&self) -> StoreResult<()> {
        let span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<CredentialRecord>> {
        let query = "SELECT user_id, username, password FROM users WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        row.map(|row| -> StoreResult<CredentialRecord> {
            Ok(CredentialRecord {
                user_id: row.try_get("user_id")?,
                username: row.try_get("username")?,
                password_hash: row.try_get("password")?,
            })
        })
        .transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<Identity>> {
        let query = "SELECT user_id, username FROM users ORDER BY user_id";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        rows.iter().map(identity_from_row).collect()
    }
}
