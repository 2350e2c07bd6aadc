use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: maap_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Domain events are published here after their transaction commits.
    pub event_bus: Arc<maap_events::EventBus>,
}
