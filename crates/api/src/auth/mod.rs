//! Session tokens.
//!
//! The OAuth handshake happens in an external login service, which mints a
//! session token with [`session::issue_session_token`] and hands it to the
//! browser as the `fetchboard_session` cookie.

pub mod session;
