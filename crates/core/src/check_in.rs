//! Check-in vocabulary: kinds, rating scales, and derived completion state.
//!
//! A check-in is a periodic rating-and-notes exchange between an employee and
//! their manager about one subject (an assignment, the current position, or an
//! aspiration). Each side completes independently; finalization then stamps
//! the official rating and shared notes.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/* --------------------------------------------------------------------------
Kinds
-------------------------------------------------------------------------- */

/// The subject a check-in is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInKind {
    Assignment,
    Position,
    Aspiration,
}

impl CheckInKind {
    pub const ALL: [CheckInKind; 3] = [
        CheckInKind::Assignment,
        CheckInKind::Position,
        CheckInKind::Aspiration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Position => "position",
            Self::Aspiration => "aspiration",
        }
    }

    /// Parse the path segment used by the check-in routes.
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "assignment" | "assignments" => Some(Self::Assignment),
            "position" | "positions" => Some(Self::Position),
            "aspiration" | "aspirations" => Some(Self::Aspiration),
            _ => None,
        }
    }

    /// Name of the subject foreign key column / JSON key.
    pub fn subject_key(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment_id",
            Self::Position => "position_id",
            Self::Aspiration => "aspiration_id",
        }
    }
}

/* --------------------------------------------------------------------------
Ratings
-------------------------------------------------------------------------- */

/// Rating scale used by assignment and aspiration check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInRating {
    WorkingToMeet,
    Meeting,
    Exceeding,
}

impl CheckInRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkingToMeet => "working_to_meet",
            Self::Meeting => "meeting",
            Self::Exceeding => "exceeding",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "working_to_meet" => Ok(Self::WorkingToMeet),
            "meeting" => Ok(Self::Meeting),
            "exceeding" => Ok(Self::Exceeding),
            _ => Err(format!(
                "Invalid check-in rating '{s}'. Must be one of: working_to_meet, meeting, exceeding"
            )),
        }
    }
}

/// Lowest rating on the position scale.
pub const POSITION_RATING_MIN: i16 = -3;

/// Highest rating on the position scale.
pub const POSITION_RATING_MAX: i16 = 3;

/// Validate a position rating.
pub fn validate_position_rating(rating: i16) -> Result<(), String> {
    if (POSITION_RATING_MIN..=POSITION_RATING_MAX).contains(&rating) {
        Ok(())
    } else {
        Err(format!(
            "Invalid position rating {rating}. Must be between {POSITION_RATING_MIN} and {POSITION_RATING_MAX}"
        ))
    }
}

/// Validate an official rating string for a check-in of the given kind.
pub fn validate_official_rating(kind: CheckInKind, rating: &str) -> Result<(), String> {
    match kind {
        CheckInKind::Position => {
            let value: i16 = rating
                .trim()
                .parse()
                .map_err(|_| format!("Invalid position rating '{rating}'"))?;
            validate_position_rating(value)
        }
        CheckInKind::Assignment | CheckInKind::Aspiration => {
            CheckInRating::from_str_value(rating.trim()).map(|_| ())
        }
    }
}

/// A rating submitted for either side of a check-in: an integer on the
/// position scale, a named value on the assignment/aspiration scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedRating {
    Position(i16),
    Scale(CheckInRating),
}

impl SubmittedRating {
    /// Check the rating belongs to `kind`'s scale.
    pub fn check(&self, kind: CheckInKind) -> Result<(), String> {
        match (kind, self) {
            (CheckInKind::Position, Self::Position(n)) => validate_position_rating(*n),
            (CheckInKind::Position, Self::Scale(r)) => Err(format!(
                "Invalid position rating '{}'. Must be between {POSITION_RATING_MIN} and {POSITION_RATING_MAX}",
                r.as_str()
            )),
            (_, Self::Scale(_)) => Ok(()),
            (_, Self::Position(n)) => Err(format!(
                "Invalid {} rating {n}. Must be one of: working_to_meet, meeting, exceeding",
                kind.as_str()
            )),
        }
    }

    pub fn as_text(&self) -> Option<&'static str> {
        match self {
            Self::Scale(r) => Some(r.as_str()),
            Self::Position(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i16> {
        match self {
            Self::Position(n) => Some(*n),
            Self::Scale(_) => None,
        }
    }
}

/// How the employee feels about an assignment.
///
/// Deserialization is strict: any value outside this set is a client bug and
/// is rejected rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalAlignment {
    Love,
    Like,
    Neutral,
    PreferNot,
    OnlyIfNecessary,
}

impl PersonalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::Like => "like",
            Self::Neutral => "neutral",
            Self::PreferNot => "prefer_not",
            Self::OnlyIfNecessary => "only_if_necessary",
        }
    }
}

/// Validate an actual-energy percentage.
pub fn validate_energy_percentage(value: i32) -> Result<(), String> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid energy percentage {value}. Must be between 0 and 100"
        ))
    }
}

/* --------------------------------------------------------------------------
Completion state
-------------------------------------------------------------------------- */

/// Completion timestamps of one check-in. Every "completed" flag is derived
/// from whether its timestamp is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Completion {
    pub employee_completed_at: Option<Timestamp>,
    pub manager_completed_at: Option<Timestamp>,
    pub official_check_in_completed_at: Option<Timestamp>,
}

impl Completion {
    pub fn employee_completed(&self) -> bool {
        self.employee_completed_at.is_some()
    }

    pub fn manager_completed(&self) -> bool {
        self.manager_completed_at.is_some()
    }

    pub fn officially_completed(&self) -> bool {
        self.official_check_in_completed_at.is_some()
    }

    /// Both sides are done and the check-in has not been closed yet.
    pub fn ready_for_finalization(&self) -> bool {
        self.employee_completed() && self.manager_completed() && !self.officially_completed()
    }
}

/// Coerce a submitted completion flag into the timestamp to store.
///
/// `Some(true)` stamps `now` unless already stamped, `Some(false)` clears,
/// `None` leaves the existing value.
pub fn resolve_completion(
    existing: Option<Timestamp>,
    requested: Option<bool>,
    now: Timestamp,
) -> Option<Timestamp> {
    match requested {
        Some(true) => Some(existing.unwrap_or(now)),
        Some(false) => None,
        None => existing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn completion_is_derived_from_timestamps() {
        let now = Utc::now();
        let mut c = Completion::default();
        assert!(!c.employee_completed());
        assert!(!c.ready_for_finalization());

        c.employee_completed_at = Some(now);
        assert!(c.employee_completed());
        assert!(!c.ready_for_finalization());

        c.manager_completed_at = Some(now);
        assert!(c.ready_for_finalization());

        c.official_check_in_completed_at = Some(now);
        assert!(c.officially_completed());
        assert!(!c.ready_for_finalization());
    }

    #[test]
    fn resolve_completion_keeps_first_stamp() {
        let first = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(resolve_completion(Some(first), Some(true), later), Some(first));
        assert_eq!(resolve_completion(None, Some(true), later), Some(later));
        assert_eq!(resolve_completion(Some(first), Some(false), later), None);
        assert_eq!(resolve_completion(Some(first), None, later), Some(first));
    }

    #[test]
    fn official_rating_scale_depends_on_kind() {
        assert!(validate_official_rating(CheckInKind::Assignment, "meeting").is_ok());
        assert!(validate_official_rating(CheckInKind::Aspiration, "exceeding").is_ok());
        assert!(validate_official_rating(CheckInKind::Assignment, "2").is_err());
        assert!(validate_official_rating(CheckInKind::Position, "2").is_ok());
        assert!(validate_official_rating(CheckInKind::Position, "-3").is_ok());
        assert!(validate_official_rating(CheckInKind::Position, "4").is_err());
        assert!(validate_official_rating(CheckInKind::Position, "meeting").is_err());
    }

    #[test]
    fn personal_alignment_rejects_unknown_values() {
        let ok: PersonalAlignment = serde_json::from_str("\"prefer_not\"").unwrap();
        assert_eq!(ok, PersonalAlignment::PreferNot);
        let err = serde_json::from_str::<PersonalAlignment>("\"adore\"").unwrap_err();
        assert!(err.to_string().contains("unknown variant"));
    }

    #[test]
    fn kind_parses_route_segments() {
        assert_eq!(CheckInKind::from_path("assignments"), Some(CheckInKind::Assignment));
        assert_eq!(CheckInKind::from_path("position"), Some(CheckInKind::Position));
        assert_eq!(CheckInKind::from_path("goal"), None);
    }

    #[test]
    fn submitted_rating_must_match_kind() {
        let scale: SubmittedRating = serde_json::from_str(r#""meeting""#).unwrap();
        let number: SubmittedRating = serde_json::from_str("2").unwrap();
        assert!(scale.check(CheckInKind::Assignment).is_ok());
        assert!(scale.check(CheckInKind::Position).is_err());
        assert!(number.check(CheckInKind::Position).is_ok());
        assert!(number.check(CheckInKind::Aspiration).is_err());
        assert!(SubmittedRating::Position(4).check(CheckInKind::Position).is_err());
        assert!(serde_json::from_str::<SubmittedRating>(r#""great""#).is_err());
    }

    #[test]
    fn energy_percentage_bounds() {
        assert!(validate_energy_percentage(0).is_ok());
        assert!(validate_energy_percentage(100).is_ok());
        assert!(validate_energy_percentage(101).is_err());
    }
}
