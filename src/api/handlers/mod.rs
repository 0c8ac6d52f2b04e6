//! API handlers for the authentication gate.

pub mod auth;
pub mod health;
pub mod root;
pub mod users;
