//! Person model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use maap_core::types::{DbId, Timestamp};

/// A row from the `people` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Person {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a person. `password_hash` is already hashed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePerson {
    pub email: String,
    pub full_name: String,
    pub password_hash: Option<String>,
}
