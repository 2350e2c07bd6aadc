//! Aspiration model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use maap_core::types::{DbId, Timestamp};

/// A row from the `aspirations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Aspiration {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an aspiration.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAspiration {
    pub organization_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}
