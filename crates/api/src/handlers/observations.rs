//! Handlers for `/organizations/{org_id}/observations`.
//!
//! Listing drops rows the viewer may not see before the feed query runs, so
//! filters, sort and spotlight counts only ever cover visible observations.
//! The detail endpoint turns a visibility denial into a 403 carrying the
//! path the client should go to instead.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use maap_core::error::CoreError;
use maap_core::forms::{require_form, ObservationParams};
use maap_core::observation::effective_privacy_on_publish;
use maap_core::observation_query::{
    most_observed, ObservationQuery, ObservationQueryParams, SpotlightReport,
};
use maap_core::policy::{authorize_member, authorize_observer, ManagerIndex};
use maap_core::types::DbId;
use maap_core::visibility::{check_visibility, visible_ids, DenialReason, Viewer, Visibility};
use maap_db::models::observation::{CreateObservation, ObservationDetail};
use maap_db::repositories::{ObservationRepo, OrganizationRepo, TeammateRepo};
use maap_db::DbPool;
use maap_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::acting::{load_viewer, ActingTeammate};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::routes::paths;
use crate::state::AppState;

/// The filtered feed plus the resolved query that produced it.
#[derive(Debug, Serialize)]
pub struct ObservationFeed {
    pub query: ObservationQuery,
    pub observations: Vec<ObservationDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spotlight: Option<SpotlightReport>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Observation",
        id,
    })
}

/* --------------------------------------------------------------------------
Shared with the public kudos handlers
-------------------------------------------------------------------------- */

/// Root company of an organization, 404 when it does not exist.
pub(crate) async fn company_of(pool: &DbPool, organization_id: DbId) -> AppResult<DbId> {
    OrganizationRepo::root_company_id(pool, organization_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id: organization_id,
        }))
}

pub(crate) async fn managers_of(pool: &DbPool, company_id: DbId) -> AppResult<ManagerIndex> {
    Ok(ManagerIndex::new(
        TeammateRepo::manager_pairs(pool, company_id).await?,
    ))
}

/// Refuse with the right status and redirect when `viewer` may not see
/// `detail`. Deleted observations read as missing.
pub(crate) fn ensure_visible(
    viewer: &Viewer,
    detail: &ObservationDetail,
    managers: &ManagerIndex,
) -> AppResult<()> {
    match check_visibility(viewer, &detail.access(), managers) {
        Visibility::Visible => Ok(()),
        Visibility::Denied(DenialReason::Deleted) => Err(not_found(detail.observation.id)),
        Visibility::Denied(reason) => {
            let redirect_to =
                paths::visibility_redirect(reason.redirect(), viewer, detail.observation.id)
                    .unwrap_or_else(|| paths::dashboard(viewer));
            tracing::debug!(
                observation_id = detail.observation.id,
                reason = ?reason,
                "Observation hidden from viewer"
            );
            Err(AppError::Core(CoreError::Denied {
                message: reason.message().to_string(),
                redirect_to,
            }))
        }
    }
}

/// An observation of the organization's company, deleted or not.
async fn load_in_company(
    pool: &DbPool,
    company_id: DbId,
    id: DbId,
) -> AppResult<ObservationDetail> {
    ObservationRepo::find_detail(pool, id)
        .await?
        .filter(|d| d.observation.company_id == company_id)
        .ok_or_else(|| not_found(id))
}

/* --------------------------------------------------------------------------
Handlers
-------------------------------------------------------------------------- */

/// GET /api/v1/organizations/{org_id}/observations
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
    Query(params): Query<ObservationQueryParams>,
) -> AppResult<Json<DataResponse<ObservationFeed>>> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_member(&acting.membership)?;

    let viewer = load_viewer(&state.pool, Some(&user)).await?;
    let details =
        ObservationRepo::list_details_for_company(&state.pool, acting.company_id).await?;

    let accesses: Vec<_> = details.iter().map(ObservationDetail::access).collect();
    let visible = visible_ids(&viewer, &accesses, &acting.managers);
    let mut by_id: HashMap<DbId, ObservationDetail> = details
        .into_iter()
        .filter(|d| visible.contains(&d.observation.id))
        .map(|d| (d.observation.id, d))
        .collect();

    let query = ObservationQuery::from_params(&params);
    let feed = query.apply(by_id.values().map(ObservationDetail::feed).collect(), Utc::now());
    let spotlight = query.spotlight.map(|_| most_observed(&feed));
    let observations = feed.iter().filter_map(|f| by_id.remove(&f.id)).collect();

    Ok(Json(DataResponse {
        data: ObservationFeed {
            query,
            observations,
            spotlight,
        },
    }))
}

/// POST /api/v1/organizations/{org_id}/observations
///
/// Saves a draft unless `publish` is set. Publishing narrows a public
/// observation that carries a negative rating.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
    Json(params): Json<ObservationParams>,
) -> AppResult<(StatusCode, Json<DataResponse<ObservationDetail>>)> {
    let acting = ActingTeammate::load(&state.pool, &user, org_id).await?;
    authorize_member(&acting.membership)?;

    let form = require_form(params.observation)?;
    let mut errors = form.field_errors();
    for &observee_id in &form.observee_ids {
        let in_company = TeammateRepo::membership(&state.pool, observee_id)
            .await?
            .is_some_and(|m| m.company_id == acting.company_id);
        if !in_company {
            errors.add(
                "observee_ids",
                format!("teammate {observee_id} is not part of this organization"),
            );
        }
    }
    errors.into_result()?;

    let now = Utc::now();
    let privacy_level = if form.publish {
        effective_privacy_on_publish(form.privacy_level, &form.rating_values())
    } else {
        form.privacy_level
    };

    let input = CreateObservation {
        observer_person_id: user.person_id,
        company_id: acting.company_id,
        title: form.title.clone().filter(|t| !t.trim().is_empty()),
        story: form.story.clone(),
        primary_feeling: form.primary_feeling.clone(),
        privacy_level,
        observed_at: form.observed_at.unwrap_or(now),
        published_at: form.publish.then_some(now),
        observee_teammate_ids: form.observee_ids.clone(),
        ratings: form.ratings.iter().map(|r| (r.rateable(), r.rating)).collect(),
    };
    let detail = ObservationRepo::create(&state.pool, &input).await?;

    tracing::info!(
        observation_id = detail.observation.id,
        observer_person_id = user.person_id,
        published = form.publish,
        privacy_level = %privacy_level,
        "Observation created"
    );
    if form.publish {
        state.event_bus.publish(PlatformEvent::observation_published(
            detail.observation.id,
            user.person_id,
            privacy_level,
            form.privacy_level,
        ));
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/organizations/{org_id}/observations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ObservationDetail>>> {
    let company_id = company_of(&state.pool, org_id).await?;
    let detail = load_in_company(&state.pool, company_id, id).await?;

    let viewer = load_viewer(&state.pool, user.as_ref()).await?;
    let managers = managers_of(&state.pool, company_id).await?;
    ensure_visible(&viewer, &detail, &managers)?;

    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/organizations/{org_id}/observations/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ObservationDetail>>> {
    let company_id = company_of(&state.pool, org_id).await?;
    let detail = load_in_company(&state.pool, company_id, id).await?;
    authorize_observer(user.person_id, detail.observation.observer_person_id)?;

    let requested = detail.observation.privacy();
    let privacy_level = effective_privacy_on_publish(requested, &detail.rating_values());

    ObservationRepo::publish(&state.pool, id, privacy_level)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        observation_id = id,
        privacy_level = %privacy_level,
        narrowed = privacy_level != requested,
        "Observation published"
    );
    state.event_bus.publish(PlatformEvent::observation_published(
        id,
        user.person_id,
        privacy_level,
        requested,
    ));

    let published = ObservationRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: published }))
}

/// DELETE /api/v1/organizations/{org_id}/observations/{id}
///
/// Soft delete. Deleting twice is a no-op.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let company_id = company_of(&state.pool, org_id).await?;
    let detail = load_in_company(&state.pool, company_id, id).await?;
    authorize_observer(user.person_id, detail.observation.observer_person_id)?;

    if ObservationRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(observation_id = id, "Observation deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/organizations/{org_id}/observations/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    user: AuthUser,
    Path((org_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<ObservationDetail>>> {
    let company_id = company_of(&state.pool, org_id).await?;
    let detail = load_in_company(&state.pool, company_id, id).await?;
    authorize_observer(user.person_id, detail.observation.observer_person_id)?;

    if ObservationRepo::restore(&state.pool, id).await? {
        tracing::info!(observation_id = id, "Observation restored");
    }

    let restored = ObservationRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: restored }))
}
