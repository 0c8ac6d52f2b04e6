//! Session cookie encoding and extraction.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue},
};

use super::state::AuthConfig;

/// Build the `Set-Cookie` value carrying a session id.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    session_id: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let name = config.session_cookie_name();
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie =
        format!("{name}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Find the session id in the request cookies. Empty values count as missing.
pub(crate) fn extract_session_id(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    // HTTP/2 clients may split cookies over several headers.
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == cookie_name {
                let val = val.trim().trim_matches('"');
                return (!val.is_empty()).then(|| val.to_string());
            }
        }
    }
    None
}
