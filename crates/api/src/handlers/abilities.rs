//! Handlers for `/organizations/{org_id}/abilities`.
//!
//! Creating and editing require `can_manage_maap`. Every save resolves a
//! semantic version from the submitted `version_type`: a creation type on
//! create, a bump type on update.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maap_core::error::CoreError;
use maap_core::forms::{require_form, resolve_create, resolve_update, AbilityParams};
use maap_core::policy::{authorize_manage_maap, authorize_member};
use maap_core::types::DbId;
use maap_db::models::ability::Ability;
use maap_db::repositories::AbilityRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::edited_concurrently;
use crate::middleware::acting::ActingTeammate;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Ability",
        id,
    })
}

/// GET /api/v1/organizations/{org_id}/abilities
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Ability>>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_member(&acting.membership)?;

    let abilities = AbilityRepo::list_for_organization(&state.pool, org_id).await?;
    Ok(Json(DataResponse { data: abilities }))
}

/// GET /api/v1/organizations/{org_id}/abilities/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Ability>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_member(&acting.membership)?;

    let ability = AbilityRepo::find_in_organization(&state.pool, org_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: ability }))
}

/// POST /api/v1/organizations/{org_id}/abilities
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
    Json(params): Json<AbilityParams>,
) -> AppResult<(StatusCode, Json<DataResponse<Ability>>)> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_manage_maap(&acting.membership)?;

    let form = require_form(params.ability)?;
    let version = resolve_create(form.field_errors(), form.version_type.as_deref())?;

    let ability =
        AbilityRepo::create(&state.pool, org_id, &form, version, acting.teammate_id()).await?;
    tracing::info!(
        ability_id = ability.id,
        organization_id = org_id,
        version = %version,
        "Ability created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: ability })))
}

/// PUT /api/v1/organizations/{org_id}/abilities/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
    Json(params): Json<AbilityParams>,
) -> AppResult<Json<DataResponse<Ability>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_manage_maap(&acting.membership)?;

    let existing = AbilityRepo::find_in_organization(&state.pool, org_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let current = existing.version().map_err(AppError::InternalError)?;
    let form = require_form(params.ability)?;
    let version = resolve_update(form.field_errors(), current, form.version_type.as_deref())?;

    let ability =
        AbilityRepo::update(&state.pool, id, &form, current, version, acting.teammate_id())
            .await?
            .ok_or_else(|| edited_concurrently("Ability", id))?;
    tracing::info!(
        ability_id = id,
        from = %current,
        to = %version,
        "Ability updated"
    );
    Ok(Json(DataResponse { data: ability }))
}
