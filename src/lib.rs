//! # Oturum (Session-Backed Authentication Gate)
//!
//! `oturum` exchanges a username and password for a server-side session and
//! guards protected routes with it. The client only ever holds an opaque,
//! random session id in an `HttpOnly` cookie; the identity it maps to lives in
//! the session store.
//!
//! ## Request flow
//!
//! 1. `POST /api/auth/login` verifies the password (Argon2) and creates a
//!    session. The response sets the session cookie.
//! 2. Protected routes such as `GET /api/users` pass through the session gate,
//!    which resolves the cookie, rejects missing or expired sessions with a
//!    uniform `401`, and attaches the caller's identity to the request.
//!
//! ## Storage
//!
//! Users and sessions live in `PostgreSQL` (see `sql/schema.sql`). Session ids
//! are stored as SHA-256 digests so a database dump does not yield usable
//! cookies. Expired sessions are never returned by a lookup; a background
//! sweeper deletes them periodically to keep the table small.

pub mod api;
pub mod cli;
pub mod store;
