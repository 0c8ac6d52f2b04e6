//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Identity;

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(alias = "secret")]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub message: String,
    pub user_id: i64,
    pub username: String,
}

impl LoginResponse {
    pub(super) fn welcome(identity: Identity) -> Self {
        Self {
            message: format!("Hoşgeldin {}!", identity.username),
            user_id: identity.user_id,
            username: identity.username,
        }
    }
}

/// Identity attached to a request by the session gate.
///
/// Only the gate constructs it; handlers behind the gate read it through
/// `Extension<IdentityContext>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityContext {
    identity: Identity,
}

impl IdentityContext {
    pub(super) fn new(identity: Identity) -> Self {
        Self { identity }
    }

    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.identity.user_id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.identity.username
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn login_request_accepts_secret_alias() -> Result<()> {
        let request: LoginRequest =
            serde_json::from_str(r#"{"username": "bob", "secret": "correct"}"#)?;
        assert_eq!(request.username, "bob");
        assert_eq!(request.password, "correct");
        Ok(())
    }

    #[test]
    fn login_request_debug_redacts_password() -> Result<()> {
        let request: LoginRequest =
            serde_json::from_str(r#"{"username": "bob", "password": "correct"}"#)?;
        let debug = format!("{request:?}");
        assert!(debug.contains("bob"));
        assert!(!debug.contains("correct"));
        Ok(())
    }

    #[test]
    fn welcome_response_never_carries_secrets() -> Result<()> {
        let response = LoginResponse::welcome(Identity {
            user_id: 1,
            username: "bob".to_string(),
        });
        let value = serde_json::to_value(&response)?;
        assert_eq!(value["message"], "Hoşgeldin bob!");
        assert_eq!(value["user_id"], 1);
        assert_eq!(value.as_object().map(serde_json::Map::len), Some(3));
        Ok(())
    }
}
