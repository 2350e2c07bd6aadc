//! Submitted forms for MAAP records and observations.
//!
//! Each form arrives wrapped in an envelope keyed by the record name
//! (`{"ability": {...}}`). A missing key is reported as a single `base`
//! error; everything else is reported against the attribute it concerns.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::observation::{ObservationRatingValue, PrivacyLevel, Rateable, RateableType};
use crate::types::{DbId, Timestamp};
use crate::validation::{not_blank, FieldErrors};
use crate::versioning::{initial_version, next_version, SemanticVersion};

/// Error key for abilities without any milestone description.
pub const FIELD_MILESTONES: &str = "milestones";

/// Number of milestone levels an ability defines.
pub const MILESTONE_LEVELS: usize = 5;

/// Unwrap the form from its envelope, or report it missing.
pub fn require_form<T>(form: Option<T>) -> Result<T, FieldErrors> {
    form.ok_or_else(FieldErrors::form_missing)
}

fn collect<F: Validate>(form: &F) -> FieldErrors {
    form.validate().err().map(FieldErrors::from).unwrap_or_default()
}

fn finish(mut errors: FieldErrors, version: Result<SemanticVersion, FieldErrors>) -> Result<SemanticVersion, FieldErrors> {
    match version {
        Ok(v) if errors.is_empty() => Ok(v),
        Ok(_) => Err(errors),
        Err(version_errors) => {
            errors.merge(version_errors);
            Err(errors)
        }
    }
}

/// Validate a new record's fields and resolve its starting version.
pub fn resolve_create(errors: FieldErrors, version_type: Option<&str>) -> Result<SemanticVersion, FieldErrors> {
    finish(errors, initial_version(version_type))
}

/// Validate an edited record's fields and resolve its bumped version.
pub fn resolve_update(
    errors: FieldErrors,
    current: SemanticVersion,
    version_type: Option<&str>,
) -> Result<SemanticVersion, FieldErrors> {
    finish(errors, next_version(current, version_type))
}

/* --------------------------------------------------------------------------
Abilities
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AbilityForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default)]
    pub version_type: Option<String>,
    #[serde(default)]
    pub milestone_1_description: Option<String>,
    #[serde(default)]
    pub milestone_2_description: Option<String>,
    #[serde(default)]
    pub milestone_3_description: Option<String>,
    #[serde(default)]
    pub milestone_4_description: Option<String>,
    #[serde(default)]
    pub milestone_5_description: Option<String>,
}

impl AbilityForm {
    /// Milestone descriptions by level, blank ones as `None`.
    pub fn milestone_descriptions(&self) -> [Option<&str>; MILESTONE_LEVELS] {
        [
            &self.milestone_1_description,
            &self.milestone_2_description,
            &self.milestone_3_description,
            &self.milestone_4_description,
            &self.milestone_5_description,
        ]
        .map(|d| d.as_deref().map(str::trim).filter(|d| !d.is_empty()))
    }

    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = collect(self);
        if self.milestone_descriptions().iter().all(Option::is_none) {
            errors.add(FIELD_MILESTONES, "must have at least one milestone description");
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbilityParams {
    pub ability: Option<AbilityForm>,
}

/* --------------------------------------------------------------------------
Assignments
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AssignmentForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub tagline: String,
    #[serde(default)]
    pub required_activities: Option<String>,
    #[serde(default)]
    pub handbook: Option<String>,
    #[serde(default)]
    pub version_type: Option<String>,
}

impl AssignmentForm {
    pub fn field_errors(&self) -> FieldErrors {
        collect(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentParams {
    pub assignment: Option<AssignmentForm>,
}

/* --------------------------------------------------------------------------
Positions
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct PositionForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default)]
    pub version_type: Option<String>,
}

impl PositionForm {
    pub fn field_errors(&self) -> FieldErrors {
        collect(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionParams {
    pub position: Option<PositionForm>,
}

/* --------------------------------------------------------------------------
Observations
-------------------------------------------------------------------------- */

fn default_privacy() -> PrivacyLevel {
    PrivacyLevel::ObserverOnly
}

/// One rating attached to a new observation.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RatingInput {
    pub rateable_type: RateableType,
    pub rateable_id: DbId,
    pub rating: ObservationRatingValue,
}

impl RatingInput {
    pub fn rateable(&self) -> Rateable {
        Rateable::new(self.rateable_type, self.rateable_id)
    }
}

/// A new observation. `privacy_level` and rating values are strict enums:
/// anything outside their sets fails deserialization.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ObservationForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 10000, message = "is too long (maximum is 10000 characters)")
    )]
    pub story: String,
    #[serde(default)]
    pub primary_feeling: Option<String>,
    #[serde(default = "default_privacy")]
    pub privacy_level: PrivacyLevel,
    #[serde(default)]
    pub observed_at: Option<Timestamp>,
    /// Observed teammates.
    #[serde(default)]
    #[validate(length(min = 1, message = "can't be blank"))]
    pub observee_ids: Vec<DbId>,
    #[serde(default)]
    pub ratings: Vec<RatingInput>,
    /// Publish immediately instead of saving a draft.
    #[serde(default)]
    pub publish: bool,
}

impl ObservationForm {
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = collect(self);
        let mut seen = Vec::with_capacity(self.ratings.len());
        for rating in &self.ratings {
            let rateable = rating.rateable();
            if seen.contains(&rateable) {
                errors.add(
                    "ratings",
                    format!(
                        "{} {} is rated more than once",
                        rateable.kind().as_str(),
                        rateable.id()
                    ),
                );
            }
            seen.push(rateable);
        }
        errors
    }

    pub fn rating_values(&self) -> Vec<ObservationRatingValue> {
        self.ratings.iter().map(|r| r.rating).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationParams {
    pub observation: Option<ObservationForm>,
}
