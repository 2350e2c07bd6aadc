//! Teammate (membership) model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use maap_core::policy::Membership;
use maap_core::types::{DbId, Timestamp};

/// A row from the `teammates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Teammate {
    pub id: DbId,
    pub person_id: DbId,
    pub organization_id: DbId,
    pub can_manage_employment: bool,
    pub can_create_employment: bool,
    pub can_manage_maap: bool,
    pub first_employed_at: Option<Timestamp>,
    pub last_terminated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a teammate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTeammate {
    pub person_id: DbId,
    pub organization_id: DbId,
    #[serde(default)]
    pub can_manage_employment: bool,
    #[serde(default)]
    pub can_create_employment: bool,
    #[serde(default)]
    pub can_manage_maap: bool,
    pub first_employed_at: Option<Timestamp>,
}

/// A teammate row joined with the root company of its organization.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRow {
    pub teammate_id: DbId,
    pub person_id: DbId,
    pub organization_id: DbId,
    pub company_id: DbId,
    pub can_manage_employment: bool,
    pub can_create_employment: bool,
    pub can_manage_maap: bool,
    pub first_employed_at: Option<Timestamp>,
    pub last_terminated_at: Option<Timestamp>,
}

impl From<MembershipRow> for Membership {
    fn from(row: MembershipRow) -> Self {
        Membership {
            teammate_id: row.teammate_id,
            person_id: row.person_id,
            organization_id: row.organization_id,
            company_id: row.company_id,
            can_manage_employment: row.can_manage_employment,
            can_create_employment: row.can_create_employment,
            can_manage_maap: row.can_manage_maap,
            first_employed_at: row.first_employed_at,
            last_terminated_at: row.last_terminated_at,
        }
    }
}
