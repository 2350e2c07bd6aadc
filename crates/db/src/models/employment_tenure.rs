//! Employment tenure model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use maap_core::types::{DbId, Timestamp};

/// A row from the `employment_tenures` table. The tenure with no `ended_at`
/// is the teammate's current one.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmploymentTenure {
    pub id: DbId,
    pub teammate_id: DbId,
    pub position_id: Option<DbId>,
    pub manager_teammate_id: Option<DbId>,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for starting a tenure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmploymentTenure {
    pub teammate_id: DbId,
    pub position_id: Option<DbId>,
    pub manager_teammate_id: Option<DbId>,
    pub started_at: Option<Timestamp>,
}
