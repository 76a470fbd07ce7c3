//! Wire models shared by the server, the repositories and the client.
//!
//! JSON field names are camelCase to match the REST surface.

pub mod display;
pub mod query;
pub mod widget;
