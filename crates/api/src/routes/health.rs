use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when either check below fails.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether published notifications have a recorder subscribed.
    pub notifications_recorded: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = maap_db::health_check(&state.pool).await.is_ok();
    let notifications_recorded = state.event_bus.subscriber_count() > 0;
    if !notifications_recorded {
        tracing::warn!("Health check: no notification recorder subscribed");
    }

    Json(HealthResponse {
        status: if db_healthy && notifications_recorded {
            "ok"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        notifications_recorded,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
