//! Paths handed to clients in `redirect_to`.

use maap_core::types::DbId;
use maap_core::visibility::{RedirectTarget, Viewer};

/// Dashboard of the viewer's first organization, or the generic one.
pub fn dashboard(viewer: &Viewer) -> String {
    match viewer.memberships.first() {
        Some(m) => format!("/api/v1/organizations/{}/dashboard", m.organization_id),
        None => "/api/v1/dashboard".to_string(),
    }
}

pub fn kudos_permalink(observation_id: DbId) -> String {
    format!("/api/v1/public/kudos/{observation_id}")
}

pub fn finalization_form(organization_id: DbId, teammate_id: DbId) -> String {
    format!("/api/v1/organizations/{organization_id}/teammates/{teammate_id}/check-ins")
}

pub fn maap_snapshot(organization_id: DbId, snapshot_id: DbId) -> String {
    format!("/api/v1/organizations/{organization_id}/maap-snapshots/{snapshot_id}")
}

/// Resolve a visibility redirect for a concrete viewer and observation.
pub fn visibility_redirect(
    target: RedirectTarget,
    viewer: &Viewer,
    observation_id: DbId,
) -> Option<String> {
    match target {
        RedirectTarget::Dashboard => Some(dashboard(viewer)),
        RedirectTarget::KudosPermalink => Some(kudos_permalink(observation_id)),
        RedirectTarget::NotFound => None,
    }
}
