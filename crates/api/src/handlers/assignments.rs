//! Handlers for `/organizations/{org_id}/assignments`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maap_core::error::CoreError;
use maap_core::forms::{require_form, resolve_create, resolve_update, AssignmentParams};
use maap_core::policy::{authorize_manage_maap, authorize_member};
use maap_core::types::DbId;
use maap_db::models::assignment::Assignment;
use maap_db::repositories::AssignmentRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::edited_concurrently;
use crate::middleware::acting::ActingTeammate;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/organizations/{org_id}/assignments
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_member(&acting.membership)?;

    let assignments = AssignmentRepo::list_for_organization(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// GET /api/v1/organizations/{org_id}/assignments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Assignment>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_member(&acting.membership)?;

    let assignment = AssignmentRepo::find_in_organization(&state.pool, org_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id,
        }))?;
    Ok(Json(DataResponse { data: assignment }))
}

/// POST /api/v1/organizations/{org_id}/assignments
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
    Json(params): Json<AssignmentParams>,
) -> AppResult<(StatusCode, Json<DataResponse<Assignment>>)> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_manage_maap(&acting.membership)?;

    let form = require_form(params.assignment)?;
    let version = resolve_create(form.field_errors(), form.version_type.as_deref())?;

    let assignment = AssignmentRepo::create(&state.pool, org_id, &form, version).await?;
    tracing::info!(assignment_id = assignment.id, version = %version, "Assignment created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// PUT /api/v1/organizations/{org_id}/assignments/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
    Json(params): Json<AssignmentParams>,
) -> AppResult<Json<DataResponse<Assignment>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_manage_maap(&acting.membership)?;

    let existing = AssignmentRepo::find_in_organization(&state.pool, org_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id,
        }))?;

    let current = existing.version().map_err(AppError::InternalError)?;
    let form = require_form(params.assignment)?;
    let version = resolve_update(form.field_errors(), current, form.version_type.as_deref())?;

    let assignment = AssignmentRepo::update(&state.pool, id, &form, current, version)
        .await?
        .ok_or_else(|| edited_concurrently("Assignment", id))?;
    tracing::info!(assignment_id = id, version = %version, "Assignment updated");
    Ok(Json(DataResponse { data: assignment }))
}
