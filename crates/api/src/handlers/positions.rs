//! Handlers for `/organizations/{org_id}/positions`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maap_core::error::CoreError;
use maap_core::forms::{require_form, resolve_create, resolve_update, PositionParams};
use maap_core::policy::{authorize_manage_maap, authorize_member};
use maap_core::types::DbId;
use maap_db::models::position::Position;
use maap_db::repositories::PositionRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::edited_concurrently;
use crate::middleware::acting::ActingTeammate;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/organizations/{org_id}/positions
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Position>>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_member(&acting.membership)?;

    let positions = PositionRepo::list_for_organization(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: positions }))
}

/// GET /api/v1/organizations/{org_id}/positions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Position>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_member(&acting.membership)?;

    let position = PositionRepo::find_in_organization(&state.pool, org_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Position",
            id,
        }))?;
    Ok(Json(DataResponse { data: position }))
}

/// POST /api/v1/organizations/{org_id}/positions
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
    Json(params): Json<PositionParams>,
) -> AppResult<(StatusCode, Json<DataResponse<Position>>)> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_manage_maap(&acting.membership)?;

    let form = require_form(params.position)?;
    let version = resolve_create(form.field_errors(), form.version_type.as_deref())?;

    let position = PositionRepo::create(&state.pool, org_id, &form, version).await?;
    tracing::info!(position_id = position.id, version = %version, "Position created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: position })))
}

/// PUT /api/v1/organizations/{org_id}/positions/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
    Json(params): Json<PositionParams>,
) -> AppResult<Json<DataResponse<Position>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_manage_maap(&acting.membership)?;

    let existing = PositionRepo::find_in_organization(&state.pool, org_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Position",
            id,
        }))?;

    let current = existing.version().map_err(AppError::InternalError)?;
    let form = require_form(params.position)?;
    let version = resolve_update(form.field_errors(), current, form.version_type.as_deref())?;

    let position = PositionRepo::update(&state.pool, id, &form, current, version)
        .await?
        .ok_or_else(|| edited_concurrently("Position", id))?;
    tracing::info!(position_id = id, version = %version, "Position updated");
    Ok(Json(DataResponse { data: position }))
}
