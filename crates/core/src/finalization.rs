//! Check-in finalization planning.
//!
//! Finalization closes a batch of a teammate's check-ins and records the
//! resulting official state as one immutable MAAP snapshot. This module is
//! the pure half of that workflow: it matches submitted form values to
//! check-ins, validates them, and produces a [`FinalizationPlan`] holding
//! both the per-check-in stamps and the snapshot document. Persisting the
//! plan atomically is the database layer's job.
//!
//! Submitted values are keyed by subject id (assignment id, aspiration id).
//! Each check-in only ever reads the entry under its own subject id, so a
//! subject that was left out of the submission keeps its stored values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::check_in::{validate_official_rating, CheckInKind, Completion};
use crate::types::{DbId, Timestamp};

/// `change_type` recorded on snapshots produced by finalization.
pub const CHANGE_TYPE_BULK_FINALIZATION: &str = "bulk_check_in_finalization";

/* --------------------------------------------------------------------------
Submitted parameters
-------------------------------------------------------------------------- */

/// Truthy marker submitted by checkbox-style form fields.
///
/// Accepts `true`, `1`, and the strings `"1"`, `"true"`, `"yes"`, `"on"`
/// (case-insensitive). Everything else, including absence, is false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Flag(pub bool);

impl Flag {
    pub fn is_set(&self) -> bool {
        self.0
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let set = match value {
            serde_json::Value::Bool(b) => b,
            serde_json::Value::Number(n) => n.as_i64() == Some(1),
            serde_json::Value::String(s) => {
                matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
            }
            _ => false,
        };
        Ok(Flag(set))
    }
}

/// Accept a JSON string or number as text (position ratings arrive as either).
fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Values submitted for one subject.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FinalizeEntry {
    #[serde(default)]
    pub finalize: Flag,
    #[serde(default, deserialize_with = "loose_string")]
    pub official_rating: Option<String>,
    #[serde(default)]
    pub shared_notes: Option<String>,
}

/// The full finalization form.
///
/// Both the bracketed keys and the legacy flat keys (`[assignment_check_ins]`)
/// land in the same fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FinalizationParams {
    #[serde(default, alias = "[assignment_check_ins]")]
    pub assignment_check_ins: BTreeMap<DbId, FinalizeEntry>,
    #[serde(default, alias = "[position_check_in]")]
    pub position_check_in: Option<FinalizeEntry>,
    #[serde(default, alias = "[aspiration_check_ins]")]
    pub aspiration_check_ins: BTreeMap<DbId, FinalizeEntry>,
    /// Optional free-text reason stored on the snapshot.
    #[serde(default)]
    pub reason: Option<String>,
}

/* --------------------------------------------------------------------------
Stored state
-------------------------------------------------------------------------- */

/// The current stored state of one check-in, as loaded by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInState {
    pub check_in_id: DbId,
    pub subject_id: DbId,
    pub employee_rating: Option<String>,
    pub manager_rating: Option<String>,
    pub official_rating: Option<String>,
    pub shared_notes: Option<String>,
    pub completion: Completion,
}

/// A milestone the teammate has attained on an ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneState {
    pub ability_id: DbId,
    pub milestone_level: i16,
    pub certified_by_teammate_id: Option<DbId>,
    pub attained_at: Timestamp,
}

/// Everything needed to plan one finalization.
#[derive(Debug, Clone, Copy)]
pub struct FinalizationInput<'a> {
    pub assignment_check_ins: &'a [CheckInState],
    pub position_check_in: Option<&'a CheckInState>,
    pub aspiration_check_ins: &'a [CheckInState],
    pub milestones: &'a [MilestoneState],
    pub params: &'a FinalizationParams,
}

/* --------------------------------------------------------------------------
Plan
-------------------------------------------------------------------------- */

/// Official values to write onto one check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficialStamp {
    pub kind: CheckInKind,
    pub check_in_id: DbId,
    pub subject_id: DbId,
    pub official_rating: Option<String>,
    pub shared_notes: String,
}

/// The `official_check_in` block of a snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialCheckIn {
    pub official_rating: Option<String>,
    pub shared_notes: String,
}

/// One subject as captured in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspiration_id: Option<DbId>,
    pub check_in_id: DbId,
    pub employee_rating: Option<String>,
    pub manager_rating: Option<String>,
    /// Whether this subject was closed out by the finalization that produced
    /// the snapshot.
    pub finalized: bool,
    pub official_check_in: OfficialCheckIn,
}

impl SubjectSnapshot {
    /// The subject id regardless of kind.
    pub fn subject_id(&self) -> Option<DbId> {
        self.assignment_id.or(self.position_id).or(self.aspiration_id)
    }
}

/// The `maap_data` document of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaapData {
    pub assignments: Vec<SubjectSnapshot>,
    pub position: Option<SubjectSnapshot>,
    pub aspirations: Vec<SubjectSnapshot>,
    pub milestones: Vec<MilestoneState>,
}

impl MaapData {
    /// Find the snapshot entry for an assignment.
    pub fn assignment(&self, assignment_id: DbId) -> Option<&SubjectSnapshot> {
        self.assignments
            .iter()
            .find(|a| a.assignment_id == Some(assignment_id))
    }

    /// Find the snapshot entry for an aspiration.
    pub fn aspiration(&self, aspiration_id: DbId) -> Option<&SubjectSnapshot> {
        self.aspirations
            .iter()
            .find(|a| a.aspiration_id == Some(aspiration_id))
    }
}

/// Check-in ids finalized per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationSummary {
    pub assignment_check_in_ids: Vec<DbId>,
    pub position_check_in_id: Option<DbId>,
    pub aspiration_check_in_ids: Vec<DbId>,
}

/// Result of planning: what to stamp and what to snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizationPlan {
    pub stamps: Vec<OfficialStamp>,
    pub maap_data: MaapData,
    pub summary: FinalizationSummary,
}

/* --------------------------------------------------------------------------
Errors
-------------------------------------------------------------------------- */

/// Why a finalization could not be planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizationError {
    /// No entry carried a truthy `finalize` marker.
    NothingSelected,
    /// Submitted values name a subject the teammate has no check-in for.
    UnknownSubject { kind: CheckInKind, subject_id: DbId },
    /// The check-in is closed or one side has not completed it.
    NotReady { kind: CheckInKind, subject_id: DbId },
    /// The official rating is not on the kind's scale.
    InvalidRating {
        kind: CheckInKind,
        subject_id: DbId,
        message: String,
    },
}

impl fmt::Display for FinalizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingSelected => write!(f, "No check-ins were selected for finalization"),
            Self::UnknownSubject { kind, subject_id } => write!(
                f,
                "No {} check-in exists for {} {subject_id}",
                kind.as_str(),
                kind.as_str()
            ),
            Self::NotReady { kind, subject_id } => write!(
                f,
                "The {} check-in for {} {subject_id} is not ready for finalization",
                kind.as_str(),
                kind.as_str()
            ),
            Self::InvalidRating { message, .. } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for FinalizationError {}

/* --------------------------------------------------------------------------
Planning
-------------------------------------------------------------------------- */

fn stored_official(state: &CheckInState) -> OfficialCheckIn {
    OfficialCheckIn {
        official_rating: state.official_rating.clone(),
        shared_notes: state.shared_notes.clone().unwrap_or_default(),
    }
}

/// Resolve one subject against the entry submitted under its own id.
fn plan_subject(
    kind: CheckInKind,
    state: &CheckInState,
    entry: Option<&FinalizeEntry>,
    stamps: &mut Vec<OfficialStamp>,
) -> Result<SubjectSnapshot, FinalizationError> {
    let selected = entry.filter(|e| e.finalize.is_set());

    let official = match selected {
        Some(entry) => {
            if !state.completion.ready_for_finalization() {
                return Err(FinalizationError::NotReady {
                    kind,
                    subject_id: state.subject_id,
                });
            }

            let official_rating = entry
                .official_rating
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .or_else(|| state.official_rating.clone());

            if let Some(rating) = official_rating.as_deref() {
                validate_official_rating(kind, rating).map_err(|message| {
                    FinalizationError::InvalidRating {
                        kind,
                        subject_id: state.subject_id,
                        message,
                    }
                })?;
            }

            let shared_notes = entry
                .shared_notes
                .clone()
                .or_else(|| state.shared_notes.clone())
                .unwrap_or_default();

            stamps.push(OfficialStamp {
                kind,
                check_in_id: state.check_in_id,
                subject_id: state.subject_id,
                official_rating: official_rating.clone(),
                shared_notes: shared_notes.clone(),
            });

            OfficialCheckIn {
                official_rating,
                shared_notes,
            }
        }
        None => stored_official(state),
    };

    let subject_id = Some(state.subject_id);
    Ok(SubjectSnapshot {
        assignment_id: subject_id.filter(|_| kind == CheckInKind::Assignment),
        position_id: subject_id.filter(|_| kind == CheckInKind::Position),
        aspiration_id: subject_id.filter(|_| kind == CheckInKind::Aspiration),
        check_in_id: state.check_in_id,
        employee_rating: state.employee_rating.clone(),
        manager_rating: state.manager_rating.clone(),
        finalized: selected.is_some(),
        official_check_in: official,
    })
}

/// Plan a keyed collection (assignments or aspirations).
fn plan_collection(
    kind: CheckInKind,
    states: &[CheckInState],
    entries: &BTreeMap<DbId, FinalizeEntry>,
    stamps: &mut Vec<OfficialStamp>,
) -> Result<Vec<SubjectSnapshot>, FinalizationError> {
    // Every selected entry must name a subject that has a check-in.
    for (subject_id, entry) in entries {
        if entry.finalize.is_set() && !states.iter().any(|s| s.subject_id == *subject_id) {
            return Err(FinalizationError::UnknownSubject {
                kind,
                subject_id: *subject_id,
            });
        }
    }

    let mut ordered: Vec<&CheckInState> = states.iter().collect();
    ordered.sort_by_key(|s| (s.subject_id, s.check_in_id));

    ordered
        .into_iter()
        .map(|state| plan_subject(kind, state, entries.get(&state.subject_id), stamps))
        .collect()
}

/// Build the finalization plan for one teammate.
pub fn plan_finalization(
    input: FinalizationInput<'_>,
) -> Result<FinalizationPlan, FinalizationError> {
    let params = input.params;
    let mut stamps = Vec::new();

    let assignments = plan_collection(
        CheckInKind::Assignment,
        input.assignment_check_ins,
        &params.assignment_check_ins,
        &mut stamps,
    )?;

    let position = match input.position_check_in {
        Some(state) => Some(plan_subject(
            CheckInKind::Position,
            state,
            params.position_check_in.as_ref(),
            &mut stamps,
        )?),
        None => {
            if params
                .position_check_in
                .as_ref()
                .is_some_and(|e| e.finalize.is_set())
            {
                return Err(FinalizationError::UnknownSubject {
                    kind: CheckInKind::Position,
                    subject_id: 0,
                });
            }
            None
        }
    };

    let aspirations = plan_collection(
        CheckInKind::Aspiration,
        input.aspiration_check_ins,
        &params.aspiration_check_ins,
        &mut stamps,
    )?;

    if stamps.is_empty() {
        return Err(FinalizationError::NothingSelected);
    }

    let summary = FinalizationSummary {
        assignment_check_in_ids: ids_of(&stamps, CheckInKind::Assignment),
        position_check_in_id: ids_of(&stamps, CheckInKind::Position).first().copied(),
        aspiration_check_in_ids: ids_of(&stamps, CheckInKind::Aspiration),
    };

    let mut milestones = input.milestones.to_vec();
    milestones.sort_by_key(|m| (m.ability_id, m.milestone_level));

    Ok(FinalizationPlan {
        stamps,
        maap_data: MaapData {
            assignments,
            position,
            aspirations,
            milestones,
        },
        summary,
    })
}

fn ids_of(stamps: &[OfficialStamp], kind: CheckInKind) -> Vec<DbId> {
    stamps
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| s.check_in_id)
        .collect()
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
