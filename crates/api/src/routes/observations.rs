//! Route definitions for observations and the public kudos pages.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{kudos, observations};
use crate::state::AppState;

/// Routes mounted at `/organizations/{org_id}`.
///
/// ```text
/// GET    /observations                -> list
/// POST   /observations                -> create
/// GET    /observations/{id}           -> get_by_id
/// DELETE /observations/{id}           -> delete
/// POST   /observations/{id}/publish   -> publish
/// POST   /observations/{id}/restore   -> restore
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/observations",
            get(observations::list).post(observations::create),
        )
        .route(
            "/observations/{id}",
            get(observations::get_by_id).delete(observations::delete),
        )
        .route("/observations/{id}/publish", post(observations::publish))
        .route("/observations/{id}/restore", post(observations::restore))
}

/// Routes mounted at `/public`. No sign-in required.
///
/// ```text
/// GET    /organizations/{org_id}/kudos  -> index
/// GET    /kudos/{id}                    -> permalink
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/kudos", get(kudos::index))
        .route("/kudos/{id}", get(kudos::permalink))
}
