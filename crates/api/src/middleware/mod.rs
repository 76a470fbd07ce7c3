//! Request extractors shared by the handlers.
//!
//! - [`auth::AuthUser`] -- Resolves the caller's identity.

pub mod auth;
