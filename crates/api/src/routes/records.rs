//! Route definitions for the versioned MAAP records.

use axum::routing::get;
use axum::Router;

use crate::handlers::{abilities, assignments, positions};
use crate::state::AppState;

/// Routes mounted at `/organizations/{org_id}`.
///
/// ```text
/// GET    /abilities          -> list
/// POST   /abilities          -> create
/// GET    /abilities/{id}     -> get_by_id
/// PUT    /abilities/{id}     -> update
/// (same for /assignments and /positions)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/abilities", get(abilities::list).post(abilities::create))
        .route(
            "/abilities/{id}",
            get(abilities::get_by_id).put(abilities::update),
        )
        .route(
            "/assignments",
            get(assignments::list).post(assignments::create),
        )
        .route(
            "/assignments/{id}",
            get(assignments::get_by_id).put(assignments::update),
        )
        .route("/positions", get(positions::list).post(positions::create))
        .route(
            "/positions/{id}",
            get(positions::get_by_id).put(positions::update),
        )
}
