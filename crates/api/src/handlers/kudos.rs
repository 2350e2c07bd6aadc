//! Public kudos: the world-visible observations of an organization.
//!
//! No sign-in is required. A bearer token, when sent, only widens what the
//! permalink may show.

use axum::extract::{Path, State};
use axum::Json;
use maap_core::types::DbId;
use maap_db::models::observation::ObservationDetail;
use maap_db::repositories::ObservationRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::observations::{company_of, ensure_visible, managers_of};
use crate::middleware::acting::load_viewer;
use crate::middleware::auth::MaybeAuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/public/organizations/{org_id}/kudos
///
/// Published, not deleted, `public_to_world` observations, newest first.
pub async fn index(
    State(state): State<AppState>,
    Path(org_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ObservationDetail>>>> {
    let company_id = company_of(&state.pool, org_id).await?;
    let kudos = ObservationRepo::list_public_for_company(&state.pool, company_id).await?;
    Ok(Json(DataResponse { data: kudos }))
}

/// GET /api/v1/public/kudos/{id}
pub async fn permalink(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ObservationDetail>>> {
    let detail = ObservationRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(maap_core::error::CoreError::NotFound {
            entity: "Observation",
            id,
        }))?;

    let viewer = load_viewer(&state.pool, user.as_ref()).await?;
    let managers = managers_of(&state.pool, detail.observation.company_id).await?;
    ensure_visible(&viewer, &detail, &managers)?;

    Ok(Json(DataResponse { data: detail }))
}
