//! MAAP snapshot model. Snapshots are insert-only.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use maap_core::types::{DbId, Timestamp};

/// A row from the `maap_snapshots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaapSnapshot {
    pub id: DbId,
    pub employee_teammate_id: DbId,
    pub created_by_teammate_id: Option<DbId>,
    pub company_id: DbId,
    pub change_type: String,
    pub reason: Option<String>,
    pub maap_data: serde_json::Value,
    pub request_info: serde_json::Value,
    pub effective_date: NaiveDate,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Values for a new snapshot.
#[derive(Debug, Clone)]
pub struct CreateMaapSnapshot {
    pub employee_teammate_id: DbId,
    pub created_by_teammate_id: DbId,
    pub company_id: DbId,
    pub change_type: String,
    pub reason: Option<String>,
    pub maap_data: serde_json::Value,
    pub request_info: serde_json::Value,
    pub effective_date: NaiveDate,
}
