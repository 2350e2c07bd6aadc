//! Ability model.

use serde::Serialize;
use sqlx::FromRow;
use maap_core::types::{DbId, Timestamp};
use maap_core::versioning::SemanticVersion;

/// A row from the `abilities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ability {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub description: String,
    pub semantic_version: String,
    pub milestone_1_description: Option<String>,
    pub milestone_2_description: Option<String>,
    pub milestone_3_description: Option<String>,
    pub milestone_4_description: Option<String>,
    pub milestone_5_description: Option<String>,
    pub created_by_teammate_id: Option<DbId>,
    pub updated_by_teammate_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ability {
    /// Parsed `semantic_version`.
    pub fn version(&self) -> Result<SemanticVersion, String> {
        SemanticVersion::parse(&self.semantic_version)
    }
}
