use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};

use crate::api::handlers::auth::{DEFAULT_SESSION_COOKIE_NAME, MAX_SESSION_TTL_SECONDS};

pub const ARG_SESSION_COOKIE_NAME: &str = "session-cookie-name";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";
pub const ARG_SESSION_ROLLING: &str = "session-rolling";
pub const ARG_SESSION_SWEEP_INTERVAL_SECONDS: &str = "session-sweep-interval-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub cookie_name: String,
    pub ttl_seconds: i64,
    pub cookie_secure: bool,
    pub rolling: bool,
    pub sweep_interval_seconds: u64,
}

impl Options {
    /// Parse session arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is somehow absent.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let cookie_name = matches
            .get_one::<String>(ARG_SESSION_COOKIE_NAME)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing argument: --{ARG_SESSION_COOKIE_NAME}"))?;
        let ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("missing argument: --{ARG_SESSION_TTL_SECONDS}"))?;
        let sweep_interval_seconds = matches
            .get_one::<u64>(ARG_SESSION_SWEEP_INTERVAL_SECONDS)
            .copied()
            .ok_or_else(|| {
                anyhow::anyhow!("missing argument: --{ARG_SESSION_SWEEP_INTERVAL_SECONDS}")
            })?;

        Ok(Self {
            cookie_name,
            ttl_seconds,
            cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
            rolling: matches.get_flag(ARG_SESSION_ROLLING),
            sweep_interval_seconds,
        })
    }
}

/// Cookie names must be RFC 6265 tokens.
#[must_use]
pub fn validator_cookie_name() -> ValueParser {
    ValueParser::from(move |name: &str| -> std::result::Result<String, String> {
        let separators = "()<>@,;:\\\"/[]?={} \t";
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_graphic() && !separators.contains(c));
        if valid {
            Ok(name.to_string())
        } else {
            Err(format!("invalid cookie name: {name:?}"))
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_COOKIE_NAME)
                .long(ARG_SESSION_COOKIE_NAME)
                .help("Name of the cookie carrying the session id")
                .env("OTURUM_SESSION_COOKIE_NAME")
                .default_value(DEFAULT_SESSION_COOKIE_NAME)
                .value_parser(validator_cookie_name()),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session lifetime in seconds, also used as the cookie Max-Age")
                .env("OTURUM_SESSION_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("OTURUM_SESSION_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_SESSION_ROLLING)
                .long(ARG_SESSION_ROLLING)
                .help("Extend a session's expiry each time it passes the gate")
                .env("OTURUM_SESSION_ROLLING")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_SESSION_SWEEP_INTERVAL_SECONDS)
                .long(ARG_SESSION_SWEEP_INTERVAL_SECONDS)
                .help("How often expired sessions are deleted, in seconds")
                .env("OTURUM_SESSION_SWEEP_INTERVAL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
