//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_CORS_ORIGIN, ARG_DSN, ARG_PORT, session};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .filter(|dsn| !dsn.trim().is_empty())
        .context("missing required argument: --dsn")?;
    let cors_origin = matches
        .get_one::<String>(ARG_CORS_ORIGIN)
        .cloned()
        .filter(|origin| !origin.trim().is_empty());

    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        cors_origin,
        session_cookie_name: session_opts.cookie_name,
        session_ttl_seconds: session_opts.ttl_seconds,
        session_cookie_secure: session_opts.cookie_secure,
        session_rolling: session_opts.rolling,
        session_sweep_interval_seconds: session_opts.sweep_interval_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_action_from_args() -> Result<()> {
        temp_env::with_vars(
            [
                ("OTURUM_DSN", None::<&str>),
                ("OTURUM_CORS_ORIGIN", Some("")),
                ("OTURUM_SESSION_ROLLING", None),
                ("OTURUM_SESSION_TTL_SECONDS", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec![
                    "oturum",
                    "--dsn",
                    "postgres://localhost/oturum",
                    "--session-rolling",
                ]);
                let Action::Server(args) = handler(&matches)?;
                assert_eq!(args.dsn, "postgres://localhost/oturum");
                assert_eq!(args.cors_origin, None);
                assert!(args.session_rolling);
                assert_eq!(args.session_ttl_seconds, 3600);
                Ok(())
            },
        )
    }

    #[test]
    fn empty_dsn_is_rejected() {
        temp_env::with_var("OTURUM_DSN", Some("  "), || {
            let matches = crate::cli::commands::new().get_matches_from(vec!["oturum"]);
            let result = handler(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err.to_string().contains("missing required argument: --dsn"));
            }
        });
    }
}
