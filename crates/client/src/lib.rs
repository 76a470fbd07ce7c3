//! Typed client for the fetch board REST API.
//!
//! [`ApiClient`] maps each endpoint to a method. [`QueriesStore`] and
//! [`DashboardStore`] keep a local copy of the caller's records and expose
//! their loading progress as a [`LoadState`].

pub mod api;
pub mod dashboard;
pub mod error;
pub mod queries;
pub mod state;

pub use api::ApiClient;
pub use dashboard::DashboardStore;
pub use error::ClientError;
pub use queries::QueriesStore;
pub use state::{Collection, LoadState};
