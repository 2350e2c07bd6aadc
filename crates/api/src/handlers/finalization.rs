//! Check-in finalization.
//!
//! A manager closes out a teammate's completed check-ins in one submission.
//! The plan is computed in `maap_core::finalization`; the snapshot insert and
//! every official stamp are committed in one transaction, and nothing is
//! persisted when either step fails.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use maap_core::finalization::{
    plan_finalization, FinalizationInput, FinalizationParams, FinalizationSummary,
    CHANGE_TYPE_BULK_FINALIZATION,
};
use maap_core::policy::authorize_finalize;
use maap_core::types::DbId;
use maap_db::models::maap_snapshot::{CreateMaapSnapshot, MaapSnapshot};
use maap_db::repositories::{
    CheckInRepo, FinalizationCommitError, FinalizationRepo, MilestoneRepo,
};
use maap_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::acting::ActingTeammate;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, Redirect};
use crate::routes::paths;
use crate::state::AppState;

/// A committed finalization.
#[derive(Debug, Serialize)]
pub struct FinalizationResult {
    pub snapshot: MaapSnapshot,
    pub summary: FinalizationSummary,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Client address, user agent and request id recorded on the snapshot.
fn request_info(headers: &HeaderMap) -> serde_json::Value {
    let ip_address = header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .or_else(|| header(headers, "x-real-ip"));
    serde_json::json!({
        "ip_address": ip_address,
        "user_agent": header(headers, "user-agent"),
        "request_id": header(headers, "x-request-id"),
        "timestamp": Utc::now(),
    })
}

/// POST /api/v1/organizations/{org_id}/teammates/{id}/finalization
pub async fn finalize(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, teammate_id)): Path<(DbId, DbId)>,
    headers: HeaderMap,
    Json(params): Json<FinalizationParams>,
) -> AppResult<(StatusCode, Json<DataResponse<Redirect<FinalizationResult>>>)> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    let target = acting.target(&state.pool, teammate_id).await?;
    authorize_finalize(&acting.membership, &target, &acting.managers)?;

    let form_path = paths::finalization_form(org_id, teammate_id);
    let failed = |message: String| AppError::Finalization {
        message,
        redirect_to: form_path.clone(),
    };

    // Closed check-ins are carried into the snapshot as-is and can't be
    // selected again.
    let current = CheckInRepo::list_current(&state.pool, teammate_id).await?;
    let assignments: Vec<_> = current.assignment_check_ins.iter().map(|c| c.to_state()).collect();
    let position = current.position_check_in.as_ref().map(|c| c.to_state());
    let aspirations: Vec<_> = current.aspiration_check_ins.iter().map(|c| c.to_state()).collect();
    let milestones: Vec<_> = MilestoneRepo::list_for_teammate(&state.pool, teammate_id)
        .await?
        .iter()
        .map(|m| m.to_state())
        .collect();

    let plan = plan_finalization(FinalizationInput {
        assignment_check_ins: &assignments,
        position_check_in: position.as_ref(),
        aspiration_check_ins: &aspirations,
        milestones: &milestones,
        params: &params,
    })
    .map_err(|e| {
        tracing::warn!(teammate_id, error = %e, "Finalization rejected");
        failed(e.to_string())
    })?;

    let maap_data = serde_json::to_value(&plan.maap_data)
        .map_err(|e| AppError::InternalError(format!("Failed to encode MAAP data: {e}")))?;

    let snapshot = CreateMaapSnapshot {
        employee_teammate_id: teammate_id,
        created_by_teammate_id: acting.teammate_id(),
        company_id: acting.company_id,
        change_type: CHANGE_TYPE_BULK_FINALIZATION.to_string(),
        reason: params.reason.clone().filter(|r| !r.trim().is_empty()),
        maap_data,
        request_info: request_info(&headers),
        effective_date: Utc::now().date_naive(),
    };

    let created = FinalizationRepo::commit(&state.pool, &snapshot, &plan.stamps)
        .await
        .map_err(|e| match e {
            FinalizationCommitError::Database(err) => AppError::Database(err),
            other => {
                tracing::warn!(teammate_id, error = %other, "Finalization rolled back");
                failed(other.to_string())
            }
        })?;

    tracing::info!(
        snapshot_id = created.id,
        teammate_id,
        finalized_by = acting.teammate_id(),
        check_ins = plan.stamps.len(),
        "Check-ins finalized"
    );
    state.event_bus.publish(PlatformEvent::maap_snapshot_finalized(
        created.id,
        user.person_id,
        teammate_id,
        plan.stamps.len(),
    ));

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: Redirect {
                redirect_to: paths::maap_snapshot(org_id, created.id),
                result: FinalizationResult {
                    snapshot: created,
                    summary: plan.summary,
                },
            },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn request_info_takes_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        let info = request_info(&headers);
        assert_eq!(info["ip_address"], "10.0.0.1");
        assert_eq!(info["user_agent"], "curl/8");
        assert_eq!(info["request_id"], "abc");
    }

    #[test]
    fn request_info_tolerates_missing_headers() {
        let info = request_info(&HeaderMap::new());
        assert!(info["ip_address"].is_null());
        assert!(info["request_id"].is_null());
    }
}
