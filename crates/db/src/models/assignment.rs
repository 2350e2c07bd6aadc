//! Assignment model.

use serde::Serialize;
use sqlx::FromRow;
use maap_core::types::{DbId, Timestamp};
use maap_core::versioning::SemanticVersion;

/// A row from the `assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assignment {
    pub id: DbId,
    pub organization_id: DbId,
    pub title: String,
    pub tagline: String,
    pub required_activities: Option<String>,
    pub handbook: Option<String>,
    pub semantic_version: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Assignment {
    /// Parsed `semantic_version`.
    pub fn version(&self) -> Result<SemanticVersion, String> {
        SemanticVersion::parse(&self.semantic_version)
    }
}
