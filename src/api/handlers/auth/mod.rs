//! Auth handlers and supporting modules.
//!
//! Login exchanges a username and password for a server-side session whose
//! random id travels in a cookie. The gate resolves that cookie on every
//! protected request.
//!
//! ## Session cookie
//!
//! The cookie carries only the session id: `HttpOnly`, `SameSite=Lax`, `Path=/`
//! and a `Max-Age` equal to the session TTL. `Secure` is opt-in for deployments
//! behind TLS.
//!
//! ## Rejections
//!
//! - Failed logins answer `401 {"message": "Geçersiz kriter!"}` whether the
//!   user is unknown or the password is wrong.
//! - Gated routes answer `401 {"message": "Geçemezsiniz!"}` for a missing,
//!   unknown or expired session.
//! - A failing session store is a `500`, never a `401`.

pub(crate) mod gate;
pub(crate) mod login;
pub(crate) mod session;
mod state;
pub(crate) mod types;

pub use gate::require_session;
pub use state::{AuthConfig, AuthState, DEFAULT_SESSION_COOKIE_NAME, MAX_SESSION_TTL_SECONDS};
pub use types::IdentityContext;
