//! Session gate for protected routes.
//!
//! Flow Overview: read the session cookie, resolve it through the session
//! store, optionally extend its expiry, then attach an `IdentityContext` and
//! hand the request on. Every rejection looks the same to the caller.

use axum::{
    extract::{Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::{session::extract_session_id, state::AuthState, types::IdentityContext};
use crate::api::error::ApiError;

/// Middleware guarding routes that need an authenticated session.
pub async fn require_session(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_identity(&auth_state, request.headers()).await {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

async fn resolve_identity(
    auth_state: &AuthState,
    headers: &HeaderMap,
) -> Result<IdentityContext, ApiError> {
    let config = auth_state.config();
    let Some(session_id) = extract_session_id(headers, config.session_cookie_name())
    else {
        debug!("request without session cookie");
        return Err(ApiError::Unauthorized);
    };

    let sessions = auth_state.sessions();
    let Some(session) = sessions.get(&session_id).await? else {
        debug!("unknown or expired session");
        return Err(ApiError::Unauthorized);
    };

    // The session may expire between get and touch.
    if config.session_rolling() && !sessions.touch(&session_id).await? {
        debug!("session expired before it could be extended");
        return Err(ApiError::Unauthorized);
    }

    Ok(IdentityContext::new(session.identity))
}
