//! Assignment, position, and aspiration check-in models.
//!
//! The three tables share the employee/manager/official column layout and
//! differ in their subject column and rating type: position ratings are
//! integers, the others use the `working_to_meet|meeting|exceeding` scale.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use maap_core::check_in::{Completion, PersonalAlignment, SubmittedRating};
use maap_core::finalization::CheckInState;
use maap_core::types::{DbId, Timestamp};

/* --------------------------------------------------------------------------
   Rows
   -------------------------------------------------------------------------- */

/// A row from the `assignment_check_ins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssignmentCheckIn {
    pub id: DbId,
    pub teammate_id: DbId,
    pub assignment_id: DbId,
    pub check_in_started_on: NaiveDate,
    pub employee_rating: Option<String>,
    pub employee_private_notes: Option<String>,
    pub employee_personal_alignment: Option<String>,
    pub actual_energy_percentage: Option<i32>,
    pub employee_completed_at: Option<Timestamp>,
    pub manager_rating: Option<String>,
    pub manager_private_notes: Option<String>,
    pub manager_completed_at: Option<Timestamp>,
    pub official_rating: Option<String>,
    pub shared_notes: Option<String>,
    pub official_check_in_completed_at: Option<Timestamp>,
    pub finalized_by_teammate_id: Option<DbId>,
    pub maap_snapshot_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `position_check_ins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PositionCheckIn {
    pub id: DbId,
    pub teammate_id: DbId,
    pub position_id: DbId,
    pub check_in_started_on: NaiveDate,
    pub employee_rating: Option<i16>,
    pub employee_private_notes: Option<String>,
    pub employee_completed_at: Option<Timestamp>,
    pub manager_rating: Option<i16>,
    pub manager_private_notes: Option<String>,
    pub manager_completed_at: Option<Timestamp>,
    pub official_rating: Option<i16>,
    pub shared_notes: Option<String>,
    pub official_check_in_completed_at: Option<Timestamp>,
    pub finalized_by_teammate_id: Option<DbId>,
    pub maap_snapshot_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `aspiration_check_ins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AspirationCheckIn {
    pub id: DbId,
    pub teammate_id: DbId,
    pub aspiration_id: DbId,
    pub check_in_started_on: NaiveDate,
    pub employee_rating: Option<String>,
    pub employee_private_notes: Option<String>,
    pub employee_completed_at: Option<Timestamp>,
    pub manager_rating: Option<String>,
    pub manager_private_notes: Option<String>,
    pub manager_completed_at: Option<Timestamp>,
    pub official_rating: Option<String>,
    pub shared_notes: Option<String>,
    pub official_check_in_completed_at: Option<Timestamp>,
    pub finalized_by_teammate_id: Option<DbId>,
    pub maap_snapshot_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AssignmentCheckIn {
    pub fn completion(&self) -> Completion {
        Completion {
            employee_completed_at: self.employee_completed_at,
            manager_completed_at: self.manager_completed_at,
            official_check_in_completed_at: self.official_check_in_completed_at,
        }
    }

    pub fn to_state(&self) -> CheckInState {
        CheckInState {
            check_in_id: self.id,
            subject_id: self.assignment_id,
            employee_rating: self.employee_rating.clone(),
            manager_rating: self.manager_rating.clone(),
            official_rating: self.official_rating.clone(),
            shared_notes: self.shared_notes.clone(),
            completion: self.completion(),
        }
    }
}

impl PositionCheckIn {
    pub fn completion(&self) -> Completion {
        Completion {
            employee_completed_at: self.employee_completed_at,
            manager_completed_at: self.manager_completed_at,
            official_check_in_completed_at: self.official_check_in_completed_at,
        }
    }

    pub fn to_state(&self) -> CheckInState {
        CheckInState {
            check_in_id: self.id,
            subject_id: self.position_id,
            employee_rating: self.employee_rating.map(|r| r.to_string()),
            manager_rating: self.manager_rating.map(|r| r.to_string()),
            official_rating: self.official_rating.map(|r| r.to_string()),
            shared_notes: self.shared_notes.clone(),
            completion: self.completion(),
        }
    }
}

impl AspirationCheckIn {
    pub fn completion(&self) -> Completion {
        Completion {
            employee_completed_at: self.employee_completed_at,
            manager_completed_at: self.manager_completed_at,
            official_check_in_completed_at: self.official_check_in_completed_at,
        }
    }

    pub fn to_state(&self) -> CheckInState {
        CheckInState {
            check_in_id: self.id,
            subject_id: self.aspiration_id,
            employee_rating: self.employee_rating.clone(),
            manager_rating: self.manager_rating.clone(),
            official_rating: self.official_rating.clone(),
            shared_notes: self.shared_notes.clone(),
            completion: self.completion(),
        }
    }
}

/// A teammate's check-ins of every kind, at most one per subject.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeammateCheckIns {
    pub assignment_check_ins: Vec<AssignmentCheckIn>,
    pub position_check_in: Option<PositionCheckIn>,
    pub aspiration_check_ins: Vec<AspirationCheckIn>,
}

/* --------------------------------------------------------------------------
   DTOs
   -------------------------------------------------------------------------- */

/// Employee side of a check-in. `employee_personal_alignment` only applies
/// to assignment check-ins and rejects unknown values at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeCheckInUpdate {
    pub employee_rating: Option<SubmittedRating>,
    pub employee_private_notes: Option<String>,
    pub employee_personal_alignment: Option<PersonalAlignment>,
    pub actual_energy_percentage: Option<i32>,
    /// `true` stamps completion, `false` reopens, absent leaves it alone.
    pub employee_completed: Option<bool>,
}

/// Manager side of a check-in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManagerCheckInUpdate {
    pub manager_rating: Option<SubmittedRating>,
    pub manager_private_notes: Option<String>,
    pub manager_completed: Option<bool>,
}

/// Resolved values written to one side of a check-in.
#[derive(Debug, Clone, Default)]
pub struct CheckInSideWrite {
    pub rating_text: Option<String>,
    pub rating_number: Option<i16>,
    pub private_notes: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub personal_alignment: Option<PersonalAlignment>,
    pub actual_energy_percentage: Option<i32>,
}

/// A check-in of any kind, tagged with its kind when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckIn {
    Assignment(AssignmentCheckIn),
    Position(PositionCheckIn),
    Aspiration(AspirationCheckIn),
}

impl CheckIn {
    pub fn id(&self) -> DbId {
        match self {
            Self::Assignment(c) => c.id,
            Self::Position(c) => c.id,
            Self::Aspiration(c) => c.id,
        }
    }

    pub fn teammate_id(&self) -> DbId {
        match self {
            Self::Assignment(c) => c.teammate_id,
            Self::Position(c) => c.teammate_id,
            Self::Aspiration(c) => c.teammate_id,
        }
    }

    pub fn completion(&self) -> Completion {
        match self {
            Self::Assignment(c) => c.completion(),
            Self::Position(c) => c.completion(),
            Self::Aspiration(c) => c.completion(),
        }
    }
}
