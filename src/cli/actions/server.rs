use crate::api::{self, handlers::auth::AuthConfig};
use anyhow::Result;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub cors_origin: Option<String>,
    pub session_cookie_name: String,
    pub session_ttl_seconds: i64,
    pub session_cookie_secure: bool,
    pub session_rolling: bool,
    pub session_sweep_interval_seconds: u64,
}

impl Args {
    fn auth_config(&self) -> AuthConfig {
        AuthConfig::new()
            .with_session_cookie_name(self.session_cookie_name.clone())
            .with_session_ttl_seconds(self.session_ttl_seconds)
            .with_session_cookie_secure(self.session_cookie_secure)
            .with_session_rolling(self.session_rolling)
            .with_sweep_interval_seconds(self.session_sweep_interval_seconds)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = args.auth_config();
    debug!(?auth_config, "starting server");

    api::new(args.port, args.dsn, args.cors_origin, auth_config).await
}
