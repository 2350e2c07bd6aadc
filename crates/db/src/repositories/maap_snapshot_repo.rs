//! Read access to the `maap_snapshots` table.
//!
//! Snapshots are written only by [`FinalizationRepo`](super::FinalizationRepo)
//! and never updated or deleted.

use sqlx::PgPool;
use maap_core::types::DbId;

use crate::models::maap_snapshot::MaapSnapshot;

/// Column list for maap_snapshots queries.
pub(crate) const COLUMNS: &str = "id, employee_teammate_id, created_by_teammate_id, company_id, \
    change_type, reason, maap_data, request_info, effective_date, created_at, updated_at";

pub struct MaapSnapshotRepo;

impl MaapSnapshotRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MaapSnapshot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maap_snapshots WHERE id = $1");
        sqlx::query_as::<_, MaapSnapshot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A teammate's snapshots, newest first.
    pub async fn list_for_teammate(
        pool: &PgPool,
        teammate_id: DbId,
    ) -> Result<Vec<MaapSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maap_snapshots
             WHERE employee_teammate_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, MaapSnapshot>(&query)
            .bind(teammate_id)
            .fetch_all(pool)
            .await
    }
}
