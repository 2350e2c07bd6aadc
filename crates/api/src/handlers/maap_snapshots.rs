//! MAAP snapshot listing and detail.
//!
//! Visible to the teammate, anyone above them in the management hierarchy,
//! and employment admins of the same company.

use axum::extract::{Path, State};
use axum::Json;
use maap_core::error::CoreError;
use maap_core::policy::authorize_view_maap;
use maap_core::types::DbId;
use maap_db::models::maap_snapshot::MaapSnapshot;
use maap_db::repositories::MaapSnapshotRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::acting::ActingTeammate;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/organizations/{org_id}/teammates/{id}/maap-snapshots
pub async fn list_for_teammate(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, teammate_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<MaapSnapshot>>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    let target = acting.target(&state.pool, teammate_id).await?;
    authorize_view_maap(&acting.membership, &target, &acting.managers)?;

    let snapshots = MaapSnapshotRepo::list_for_teammate(&state.pool, teammate_id).await?;
    Ok(Json(DataResponse { data: snapshots }))
}

/// GET /api/v1/organizations/{org_id}/maap-snapshots/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<MaapSnapshot>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;

    let snapshot = MaapSnapshotRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|s| s.company_id == acting.company_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MaapSnapshot",
            id,
        }))?;

    let target = acting
        .target(&state.pool, snapshot.employee_teammate_id)
        .await?;
    authorize_view_maap(&acting.membership, &target, &acting.managers)?;

    Ok(Json(DataResponse { data: snapshot }))
}
