//! Observation visibility.
//!
//! Decides whether a viewer (possibly anonymous) may see an observation. The
//! result is a value, not an error, so callers can pick the right response:
//! listings drop hidden rows, detail endpoints turn a denial into a redirect.
//!
//! Rules, in order:
//!
//! 1. Soft-deleted observations are never visible.
//! 2. The observer always sees their own observation.
//! 3. Drafts are visible to the observer only, whatever their privacy level.
//! 4. `public_to_world` is visible to everyone, signed in or not.
//! 5. Everything else requires an actively employed teammate of the
//!    observation's company; then the privacy level decides.

use std::collections::HashSet;

use serde::Serialize;

use crate::observation::PrivacyLevel;
use crate::policy::{ManagerIndex, Membership};
use crate::types::DbId;

/// The facts about an observation that visibility depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationAccess {
    pub observation_id: DbId,
    pub company_id: DbId,
    pub observer_person_id: DbId,
    pub observee_teammate_ids: Vec<DbId>,
    pub privacy_level: PrivacyLevel,
    pub published: bool,
    pub deleted: bool,
}

/// Who is looking.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    /// `None` for anonymous visitors.
    pub person_id: Option<DbId>,
    /// The viewer's memberships, across any companies.
    pub memberships: Vec<Membership>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn person(person_id: DbId, memberships: Vec<Membership>) -> Self {
        Self {
            person_id: Some(person_id),
            memberships,
        }
    }

    /// The membership in `company_id`, preferring an active one.
    pub fn membership_in(&self, company_id: DbId) -> Option<&Membership> {
        let in_company = || {
            self.memberships
                .iter()
                .filter(move |m| m.company_id == company_id)
        };
        in_company()
            .find(|m| m.actively_employed())
            .or_else(|| in_company().next())
    }
}

/// Why a viewer was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Deleted,
    Draft,
    NotSignedIn,
    WrongOrganization,
    NotEmployed,
    Restricted,
}

/// Where a refused viewer should be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectTarget {
    /// The viewer's own dashboard.
    Dashboard,
    /// The public kudos permalink of the observation.
    KudosPermalink,
    /// Nothing to show at all.
    NotFound,
}

impl DenialReason {
    pub fn redirect(&self) -> RedirectTarget {
        match self {
            Self::Deleted => RedirectTarget::NotFound,
            Self::NotEmployed | Self::WrongOrganization => RedirectTarget::Dashboard,
            Self::Draft | Self::NotSignedIn | Self::Restricted => RedirectTarget::KudosPermalink,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Deleted => "Observation not found",
            Self::Draft => "This observation has not been published",
            Self::NotSignedIn => "You must sign in to view this observation",
            Self::WrongOrganization => "You are not a member of this organization",
            Self::NotEmployed => "You are not an active teammate of this organization",
            Self::Restricted => "You are not permitted to view this observation",
        }
    }
}

/// Outcome of a visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Denied(DenialReason),
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible)
    }
}

/// Decide whether `viewer` may see `observation`.
pub fn check_visibility(
    viewer: &Viewer,
    observation: &ObservationAccess,
    managers: &ManagerIndex,
) -> Visibility {
    if observation.deleted {
        return Visibility::Denied(DenialReason::Deleted);
    }

    if viewer.person_id == Some(observation.observer_person_id) {
        return Visibility::Visible;
    }

    if !observation.published {
        return Visibility::Denied(DenialReason::Draft);
    }

    let level = observation.privacy_level;
    if level == PrivacyLevel::PublicToWorld {
        return Visibility::Visible;
    }

    if viewer.person_id.is_none() {
        return Visibility::Denied(DenialReason::NotSignedIn);
    }

    let membership = match viewer.membership_in(observation.company_id) {
        None => return Visibility::Denied(DenialReason::WrongOrganization),
        Some(m) if !m.actively_employed() => {
            return Visibility::Denied(DenialReason::NotEmployed)
        }
        Some(m) => m,
    };

    if level == PrivacyLevel::PublicToCompany {
        return Visibility::Visible;
    }

    let observees = &observation.observee_teammate_ids;

    if level.includes_observees() && observees.contains(&membership.teammate_id) {
        return Visibility::Visible;
    }

    if level.includes_managers()
        && observees
            .iter()
            .any(|&observee| managers.manages(membership.teammate_id, observee))
    {
        return Visibility::Visible;
    }

    Visibility::Denied(DenialReason::Restricted)
}

/// Ids of the observations `viewer` may see.
pub fn visible_ids(
    viewer: &Viewer,
    observations: &[ObservationAccess],
    managers: &ManagerIndex,
) -> HashSet<DbId> {
    observations
        .iter()
        .filter(|o| check_visibility(viewer, o, managers).is_visible())
        .map(|o| o.observation_id)
        .collect()
}
