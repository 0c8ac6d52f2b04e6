//! Auth configuration and shared state.

use chrono::TimeDelta;
use std::sync::Arc;
use std::time::Duration;

use crate::store::{CredentialStore, SessionStore, StoreResult, password::hash_password};

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "cikolatacips";
/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_TTL_SECONDS: i64 = 60 * 60 * 24 * 365;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60 * 60;

/// Session settings fixed at startup and read-only afterwards.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_cookie_name: String,
    session_ttl_seconds: i64,
    session_cookie_secure: bool,
    session_rolling: bool,
    sweep_interval_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            session_rolling: false,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: String) -> Self {
        self.session_cookie_name = name;
        self
    }

    /// Values outside `1..=MAX_SESSION_TTL_SECONDS` are clamped into range.
    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds.clamp(1, MAX_SESSION_TTL_SECONDS);
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_session_rolling(mut self, rolling: bool) -> Self {
        self.session_rolling = rolling;
        self
    }

    #[must_use]
    pub fn with_sweep_interval_seconds(mut self, seconds: u64) -> Self {
        self.sweep_interval_seconds = seconds;
        self
    }

    #[must_use]
    pub fn session_cookie_name(&self) -> &str {
        &self.session_cookie_name
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Server-side lifetime of a session, matching the cookie `Max-Age`.
    #[must_use]
    pub fn session_ttl(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.session_ttl_seconds).unwrap_or_else(|| TimeDelta::hours(1))
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    #[must_use]
    pub fn session_rolling(&self) -> bool {
        self.session_rolling
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AuthState {
    config: AuthConfig,
    sessions: Arc<dyn SessionStore>,
    credentials: Arc<dyn CredentialStore>,
    // Verified against when the username is unknown, so both failure paths cost one Argon2 run.
    dummy_hash: String,
}

impl AuthState {
    /// Build the shared state.
    ///
    /// # Errors
    /// Returns an error if the placeholder password hash cannot be produced.
    pub fn new(
        config: AuthConfig,
        sessions: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> StoreResult<Self> {
        Ok(Self {
            config,
            sessions,
            credentials,
            dummy_hash: hash_password("oturum-placeholder-password")?,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub(super) fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("dummy_hash", &"***")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = AuthConfig::new();
        assert_eq!(config.session_cookie_name(), "cikolatacips");
        assert_eq!(config.session_ttl_seconds(), 3600);
        assert_eq!(config.session_ttl(), TimeDelta::hours(1));
        assert!(!config.session_cookie_secure());
        assert!(!config.session_rolling());
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn builder_overrides() {
        let config = AuthConfig::new()
            .with_session_cookie_name("sid".to_string())
            .with_session_ttl_seconds(60)
            .with_session_cookie_secure(true)
            .with_session_rolling(true)
            .with_sweep_interval_seconds(5);
        assert_eq!(config.session_cookie_name(), "sid");
        assert_eq!(config.session_ttl(), TimeDelta::minutes(1));
        assert!(config.session_cookie_secure());
        assert!(config.session_rolling());
        assert_eq!(config.sweep_interval(), Duration::from_secs(5));
    }

    #[test]
    fn ttl_is_clamped_into_range() {
        let config = AuthConfig::new().with_session_ttl_seconds(-5);
        assert_eq!(config.session_ttl_seconds(), 1);

        let config = AuthConfig::new().with_session_ttl_seconds(0);
        assert_eq!(config.session_ttl(), TimeDelta::seconds(1));

        let config = AuthConfig::new().with_session_ttl_seconds(i64::MAX);
        assert_eq!(config.session_ttl_seconds(), MAX_SESSION_TTL_SECONDS);
        assert_eq!(config.session_ttl(), TimeDelta::days(365));
    }
}
