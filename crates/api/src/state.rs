use std::sync::Arc;

use fetchboard_db::SharedStore;

use crate::config::ServerConfig;
use crate::executor::Executor;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Key-value store holding every user's records.
    pub store: SharedStore,
    /// Server configuration (auth mode, limits, login URL).
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP executor for ad-hoc and saved queries.
    pub executor: Arc<Executor>,
}
