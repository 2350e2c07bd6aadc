//! Teammate milestone model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use maap_core::finalization::MilestoneState;
use maap_core::types::{DbId, Timestamp};

/// A row from the `teammate_milestones` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeammateMilestone {
    pub id: DbId,
    pub teammate_id: DbId,
    pub ability_id: DbId,
    pub milestone_level: i16,
    pub certified_by_teammate_id: Option<DbId>,
    pub attained_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TeammateMilestone {
    pub fn to_state(&self) -> MilestoneState {
        MilestoneState {
            ability_id: self.ability_id,
            milestone_level: self.milestone_level,
            certified_by_teammate_id: self.certified_by_teammate_id,
            attained_at: self.attained_at,
        }
    }
}

/// DTO for recording an attained milestone.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeammateMilestone {
    pub teammate_id: DbId,
    pub ability_id: DbId,
    pub milestone_level: i16,
    pub certified_by_teammate_id: Option<DbId>,
}
