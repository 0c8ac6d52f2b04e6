//! User listing behind the session gate.
//!
//! The gate has already authenticated the caller; this handler performs no
//! authorization of its own and returns every user.

use axum::{Json, extract::Extension};
use std::sync::Arc;
use tracing::debug;

use super::auth::{AuthState, IdentityContext};
use crate::{
    api::error::{ApiError, MessageResponse},
    store::Identity,
};

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users ordered by id.", body = [Identity]),
        (status = 401, description = "Missing, unknown or expired session.", body = MessageResponse),
        (status = 500, description = "Store unavailable.", body = MessageResponse),
    ),
    tag = "users"
)]
pub async fn list_users(
    Extension(context): Extension<IdentityContext>,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Json<Vec<Identity>>, ApiError> {
    debug!(user_id = context.user_id(), "listing users");
    let users = auth_state.credentials().list_users().await?;
    Ok(Json(users))
}
