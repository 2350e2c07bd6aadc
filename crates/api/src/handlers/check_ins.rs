//! Handlers for a teammate's check-ins.
//!
//! Routes live under `/organizations/{org_id}/teammates/{id}/check-ins`.
//! `{kind}` is one of `assignment`, `position` or `aspiration` (plural
//! accepted). Completion is stamped here, never by the database: a truthy
//! `*_completed` stamps the current time unless already stamped, `false`
//! reopens the side.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use maap_core::check_in::{
    resolve_completion, validate_energy_percentage, CheckInKind, SubmittedRating,
};
use maap_core::error::CoreError;
use maap_core::policy::{
    authorize_employee_side, authorize_manager_side, authorize_start_check_in,
    authorize_view_maap,
};
use maap_core::types::DbId;
use maap_core::validation::FieldErrors;
use maap_db::models::check_in::{
    CheckIn, CheckInSideWrite, EmployeeCheckInUpdate, ManagerCheckInUpdate, TeammateCheckIns,
};
use maap_db::repositories::{AspirationRepo, AssignmentRepo, CheckInRepo, PositionRepo};
use maap_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::acting::ActingTeammate;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of a check-in start.
#[derive(Debug, Deserialize)]
pub struct StartCheckIn {
    pub subject_id: DbId,
}

fn parse_kind(segment: &str) -> AppResult<CheckInKind> {
    CheckInKind::from_path(segment).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown check-in kind '{segment}'. Must be one of: assignment, position, aspiration"
        ))
    })
}

fn check_in_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CheckIn",
        id,
    })
}

/// Load an open check-in of `kind` belonging to `teammate_id`.
async fn load_open(
    pool: &DbPool,
    kind: CheckInKind,
    teammate_id: DbId,
    check_in_id: DbId,
) -> AppResult<CheckIn> {
    let check_in = CheckInRepo::find(pool, kind, check_in_id)
        .await?
        .filter(|c| c.teammate_id() == teammate_id)
        .ok_or_else(|| check_in_not_found(check_in_id))?;

    if check_in.completion().officially_completed() {
        return Err(AppError::Core(CoreError::Conflict(
            "This check-in has already been finalized".into(),
        )));
    }
    Ok(check_in)
}

/// Make sure the subject exists in the organization before opening a
/// check-in on it.
async fn ensure_subject(
    pool: &DbPool,
    kind: CheckInKind,
    organization_id: DbId,
    subject_id: DbId,
) -> AppResult<()> {
    let found = match kind {
        CheckInKind::Assignment => {
            AssignmentRepo::find_in_organization(pool, organization_id, subject_id)
                .await?
                .is_some()
        }
        CheckInKind::Position => {
            PositionRepo::find_in_organization(pool, organization_id, subject_id)
                .await?
                .is_some()
        }
        CheckInKind::Aspiration => AspirationRepo::list_for_organization(pool, organization_id)
            .await?
            .iter()
            .any(|a| a.id == subject_id),
    };

    if found {
        Ok(())
    } else {
        let entity = match kind {
            CheckInKind::Assignment => "Assignment",
            CheckInKind::Position => "Position",
            CheckInKind::Aspiration => "Aspiration",
        };
        Err(AppError::Core(CoreError::NotFound {
            entity,
            id: subject_id,
        }))
    }
}

fn check_rating(
    errors: &mut FieldErrors,
    field: &str,
    kind: CheckInKind,
    rating: Option<SubmittedRating>,
) {
    if let Some(Err(message)) = rating.map(|r| r.check(kind)) {
        errors.add(field, message);
    }
}

/// GET /api/v1/organizations/{org_id}/teammates/{id}/check-ins
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, teammate_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<TeammateCheckIns>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    let target = acting.target(&state.pool, teammate_id).await?;
    authorize_view_maap(&acting.membership, &target, &acting.managers)?;

    let open = CheckInRepo::list_open(&state.pool, teammate_id).await?;
    Ok(Json(DataResponse { data: open }))
}

/// POST /api/v1/organizations/{org_id}/teammates/{id}/check-ins/{kind}
///
/// 409 when a check-in on the same subject is already open.
pub async fn start(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, teammate_id, kind)): Path<(DbId, DbId, String)>,
    Json(input): Json<StartCheckIn>,
) -> AppResult<(StatusCode, Json<DataResponse<CheckIn>>)> {
    let kind = parse_kind(&kind)?;
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    let target = acting.target(&state.pool, teammate_id).await?;
    authorize_start_check_in(&acting.membership, &target, &acting.managers)?;

    ensure_subject(&state.pool, kind, org_id, input.subject_id).await?;

    let check_in = CheckInRepo::start(&state.pool, kind, teammate_id, input.subject_id).await?;
    tracing::info!(
        check_in_id = check_in.id(),
        kind = kind.as_str(),
        teammate_id,
        subject_id = input.subject_id,
        "Check-in started"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: check_in })))
}

/// PUT /api/v1/organizations/{org_id}/teammates/{id}/check-ins/{kind}/{check_in_id}/employee
pub async fn update_employee_side(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, teammate_id, kind, check_in_id)): Path<(DbId, DbId, String, DbId)>,
    Json(input): Json<EmployeeCheckInUpdate>,
) -> AppResult<Json<DataResponse<CheckIn>>> {
    let kind = parse_kind(&kind)?;
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    let target = acting.target(&state.pool, teammate_id).await?;
    authorize_employee_side(&acting.membership, &target)?;

    let existing = load_open(&state.pool, kind, teammate_id, check_in_id).await?;

    let mut errors = FieldErrors::new();
    check_rating(&mut errors, "employee_rating", kind, input.employee_rating);
    if kind != CheckInKind::Assignment {
        if input.employee_personal_alignment.is_some() {
            errors.add(
                "employee_personal_alignment",
                "is only recorded on assignment check-ins",
            );
        }
        if input.actual_energy_percentage.is_some() {
            errors.add(
                "actual_energy_percentage",
                "is only recorded on assignment check-ins",
            );
        }
    }
    if let Some(Err(message)) = input.actual_energy_percentage.map(validate_energy_percentage) {
        errors.add("actual_energy_percentage", message);
    }
    errors.into_result()?;

    let write = CheckInSideWrite {
        rating_text: input
            .employee_rating
            .and_then(|r| r.as_text())
            .map(str::to_string),
        rating_number: input.employee_rating.and_then(|r| r.as_number()),
        private_notes: input.employee_private_notes,
        completed_at: resolve_completion(
            existing.completion().employee_completed_at,
            input.employee_completed,
            Utc::now(),
        ),
        personal_alignment: input.employee_personal_alignment,
        actual_energy_percentage: input.actual_energy_percentage,
    };

    if !CheckInRepo::write_employee_side(&state.pool, kind, check_in_id, &write).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "This check-in was finalized while you were editing it".into(),
        )));
    }
    tracing::info!(
        check_in_id,
        kind = kind.as_str(),
        completed = write.completed_at.is_some(),
        "Employee side of check-in saved"
    );

    let updated = CheckInRepo::find(&state.pool, kind, check_in_id)
        .await?
        .ok_or_else(|| check_in_not_found(check_in_id))?;
    Ok(Json(DataResponse { data: updated }))
}

/// PUT /api/v1/organizations/{org_id}/teammates/{id}/check-ins/{kind}/{check_in_id}/manager
pub async fn update_manager_side(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, teammate_id, kind, check_in_id)): Path<(DbId, DbId, String, DbId)>,
    Json(input): Json<ManagerCheckInUpdate>,
) -> AppResult<Json<DataResponse<CheckIn>>> {
    let kind = parse_kind(&kind)?;
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    let target = acting.target(&state.pool, teammate_id).await?;
    authorize_manager_side(&acting.membership, &target, &acting.managers)?;

    let existing = load_open(&state.pool, kind, teammate_id, check_in_id).await?;

    let mut errors = FieldErrors::new();
    check_rating(&mut errors, "manager_rating", kind, input.manager_rating);
    errors.into_result()?;

    let write = CheckInSideWrite {
        rating_text: input
            .manager_rating
            .and_then(|r| r.as_text())
            .map(str::to_string),
        rating_number: input.manager_rating.and_then(|r| r.as_number()),
        private_notes: input.manager_private_notes,
        completed_at: resolve_completion(
            existing.completion().manager_completed_at,
            input.manager_completed,
            Utc::now(),
        ),
        ..CheckInSideWrite::default()
    };

    if !CheckInRepo::write_manager_side(&state.pool, kind, check_in_id, &write).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "This check-in was finalized while you were editing it".into(),
        )));
    }
    tracing::info!(
        check_in_id,
        kind = kind.as_str(),
        manager_teammate_id = acting.teammate_id(),
        completed = write.completed_at.is_some(),
        "Manager side of check-in saved"
    );

    let updated = CheckInRepo::find(&state.pool, kind, check_in_id)
        .await?
        .ok_or_else(|| check_in_not_found(check_in_id))?;
    Ok(Json(DataResponse { data: updated }))
}
