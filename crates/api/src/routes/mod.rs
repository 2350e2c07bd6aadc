pub mod auth;
pub mod health;
pub mod observations;
pub mod paths;
pub mod records;
pub mod teammates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                          login (public)
///
/// /organizations/{org_id}/abilities                    list, create
/// /organizations/{org_id}/abilities/{id}               get, update
/// /organizations/{org_id}/assignments                  list, create
/// /organizations/{org_id}/assignments/{id}             get, update
/// /organizations/{org_id}/positions                    list, create
/// /organizations/{org_id}/positions/{id}               get, update
///
/// /organizations/{org_id}/teammates/{id}/check-ins     open check-ins
/// /organizations/{org_id}/teammates/{id}/check-ins/{kind}
///                                                      start
/// /organizations/{org_id}/teammates/{id}/check-ins/{kind}/{check_in_id}/employee
/// /organizations/{org_id}/teammates/{id}/check-ins/{kind}/{check_in_id}/manager
/// /organizations/{org_id}/teammates/{id}/finalization  finalize (POST)
/// /organizations/{org_id}/teammates/{id}/maap-snapshots
/// /organizations/{org_id}/maap-snapshots/{id}
///
/// /organizations/{org_id}/observations                 list, create
/// /organizations/{org_id}/observations/{id}            get, delete
/// /organizations/{org_id}/observations/{id}/publish    publish (POST)
/// /organizations/{org_id}/observations/{id}/restore    restore (POST)
///
/// /public/organizations/{org_id}/kudos                 public kudos index
/// /public/kudos/{id}                                   public permalink
/// ```
pub fn api_routes() -> Router<AppState> {
    let organization = Router::new()
        .merge(records::router())
        .merge(teammates::router())
        .merge(observations::router());

    Router::new()
        // Authentication.
        .nest("/auth", auth::router())
        // Everything scoped to one organization.
        .nest("/organizations/{org_id}", organization)
        // Unauthenticated kudos pages.
        .nest("/public", observations::public_router())
}
