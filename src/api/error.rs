//! Error taxonomy for the HTTP surface.
//!
//! Every failure leaves the server as `{"message": ...}`. Authorization and
//! credential failures use fixed texts so callers cannot tell the causes
//! apart. Infrastructure failures are logged in full and answered with a
//! generic 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Body of every rejected protected request, whatever the cause.
pub const UNAUTHORIZED_MESSAGE: &str = "Geçemezsiniz!";
/// Body of every failed login, unknown user or wrong password alike.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Geçersiz kriter!";
pub const NOT_FOUND_MESSAGE: &str = "Not found";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("route not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Self::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            Self::BadRequest(message) => message.clone(),
            Self::NotFound => NOT_FOUND_MESSAGE.to_string(),
            Self::StoreUnavailable(_) | Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        (status, Json(MessageResponse::new(self.client_message()))).into_response()
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Turn a handler panic into the generic 500 body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("handler panicked: {detail}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::new(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> Result<MessageResponse> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn auth_failures_use_fixed_messages() -> Result<()> {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(response).await?.message, UNAUTHORIZED_MESSAGE);

        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(response).await?.message, INVALID_CREDENTIALS_MESSAGE);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_hides_details() -> Result<()> {
        let response = ApiError::from(StoreError::IdExhausted).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await?.message, INTERNAL_ERROR_MESSAGE);
        Ok(())
    }

    #[tokio::test]
    async fn not_found_fallback() -> Result<()> {
        let response = not_found().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await?.message, NOT_FOUND_MESSAGE);
        Ok(())
    }

    #[tokio::test]
    async fn panic_response_is_generic() -> Result<()> {
        let response = panic_response(Box::new("secret detail".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await?.message, INTERNAL_ERROR_MESSAGE);
        Ok(())
    }
}
