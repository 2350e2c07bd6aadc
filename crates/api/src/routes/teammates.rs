//! Route definitions for per-teammate MAAP work: check-ins, finalization
//! and snapshots.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{check_ins, finalization, maap_snapshots};
use crate::state::AppState;

/// Routes mounted at `/organizations/{org_id}`.
///
/// ```text
/// GET    /teammates/{id}/check-ins                                  -> list
/// POST   /teammates/{id}/check-ins/{kind}                           -> start
/// PUT    /teammates/{id}/check-ins/{kind}/{check_in_id}/employee    -> update_employee_side
/// PUT    /teammates/{id}/check-ins/{kind}/{check_in_id}/manager     -> update_manager_side
/// POST   /teammates/{id}/finalization                               -> finalize
/// GET    /teammates/{id}/maap-snapshots                             -> list_for_teammate
/// GET    /maap-snapshots/{id}                                       -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/teammates/{id}/check-ins", get(check_ins::list))
        .route("/teammates/{id}/check-ins/{kind}", post(check_ins::start))
        .route(
            "/teammates/{id}/check-ins/{kind}/{check_in_id}/employee",
            put(check_ins::update_employee_side),
        )
        .route(
            "/teammates/{id}/check-ins/{kind}/{check_in_id}/manager",
            put(check_ins::update_manager_side),
        )
        .route(
            "/teammates/{id}/finalization",
            post(finalization::finalize),
        )
        .route(
            "/teammates/{id}/maap-snapshots",
            get(maap_snapshots::list_for_teammate),
        )
        .route("/maap-snapshots/{id}", get(maap_snapshots::get_by_id))
}
