//! Password login endpoint.
//!
//! Flow Overview:
//! 1) Parse `{username, password}`; a missing or malformed body is a 400.
//! 2) Look the user up and verify the password with Argon2. Unknown users are
//!    verified against a placeholder hash so both failures take equal work.
//! 3) Create a session and return its id in the session cookie.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info};

use super::{
    session::session_cookie,
    state::AuthState,
    types::{LoginRequest, LoginResponse},
};
use crate::{
    api::error::{ApiError, MessageResponse},
    store::{Identity, password::verify_password},
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created; id returned in the session cookie.", body = LoginResponse),
        (status = 400, description = "Missing payload", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 500, description = "Session store unavailable", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("login payload rejected: {rejection}");
            return Err(ApiError::BadRequest("Missing payload".to_string()));
        }
    };

    let identity = authenticate(&auth_state, request).await?;
    let session = auth_state.sessions().create(identity).await?;

    let cookie = match session_cookie(auth_state.config(), &session.id) {
        Ok(cookie) => cookie,
        Err(err) => {
            // Do not leave a session behind that nobody holds.
            auth_state.sessions().delete(&session.id).await?;
            return Err(ApiError::Internal(anyhow!(
                "failed to build session cookie: {err}"
            )));
        }
    };

    info!(user_id = session.identity.user_id, "login succeeded");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(LoginResponse::welcome(session.identity)),
    ))
}

/// Check the credentials and return the identity they belong to.
async fn authenticate(auth_state: &AuthState, request: LoginRequest) -> Result<Identity, ApiError> {
    let record = auth_state
        .credentials()
        .find_by_username(&request.username)
        .await?;

    let (identity, hash) = match record {
        Some(record) => (Some(record.identity()), record.password_hash),
        None => (None, auth_state.dummy_hash().to_string()),
    };

    let password = request.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|err| anyhow!("password verification task failed: {err}"))??;

    match identity {
        Some(identity) if verified => Ok(identity),
        _ => {
            debug!("login rejected");
            Err(ApiError::InvalidCredentials)
        }
    }
}
