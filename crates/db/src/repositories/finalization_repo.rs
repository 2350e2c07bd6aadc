//! Atomic persistence of a check-in finalization.

use sqlx::PgPool;
use maap_core::check_in::CheckInKind;
use maap_core::finalization::OfficialStamp;
use maap_core::types::DbId;

use super::check_in_repo::table_name;
use super::maap_snapshot_repo::COLUMNS as SNAPSHOT_COLUMNS;
use crate::models::maap_snapshot::{CreateMaapSnapshot, MaapSnapshot};

/// Why a planned finalization could not be committed. Nothing is persisted
/// in any of these cases.
#[derive(Debug, thiserror::Error)]
pub enum FinalizationCommitError {
    /// The check-in was closed (or reopened on one side) after planning.
    #[error("The {} check-in {check_in_id} is no longer open for finalization", .kind.as_str())]
    Stale { kind: CheckInKind, check_in_id: DbId },

    #[error("Invalid position rating '{value}'")]
    PositionRating { value: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct FinalizationRepo;

impl FinalizationRepo {
    /// Insert the snapshot and stamp every check-in in `stamps`, all in one
    /// transaction.
    ///
    /// Each stamp only applies to a check-in of `snapshot.employee_teammate_id`
    /// that is still open with both sides completed; if any stamp matches no
    /// row the transaction is rolled back.
    pub async fn commit(
        pool: &PgPool,
        snapshot: &CreateMaapSnapshot,
        stamps: &[OfficialStamp],
    ) -> Result<MaapSnapshot, FinalizationCommitError> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO maap_snapshots
                (employee_teammate_id, created_by_teammate_id, company_id, change_type,
                 reason, maap_data, request_info, effective_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {SNAPSHOT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, MaapSnapshot>(&insert)
            .bind(snapshot.employee_teammate_id)
            .bind(snapshot.created_by_teammate_id)
            .bind(snapshot.company_id)
            .bind(&snapshot.change_type)
            .bind(&snapshot.reason)
            .bind(&snapshot.maap_data)
            .bind(&snapshot.request_info)
            .bind(snapshot.effective_date)
            .fetch_one(&mut *tx)
            .await?;

        for stamp in stamps {
            let table = table_name(stamp.kind);
            let stamp_query = format!(
                "UPDATE {table} SET
                    official_rating = $2,
                    shared_notes = $3,
                    official_check_in_completed_at = NOW(),
                    finalized_by_teammate_id = $4,
                    maap_snapshot_id = $5
                 WHERE id = $1
                   AND teammate_id = $6
                   AND official_check_in_completed_at IS NULL
                   AND employee_completed_at IS NOT NULL
                   AND manager_completed_at IS NOT NULL"
            );

            let query = sqlx::query(&stamp_query).bind(stamp.check_in_id);
            let query = match stamp.kind {
                CheckInKind::Position => {
                    let rating = stamp
                        .official_rating
                        .as_deref()
                        .map(|r| {
                            r.trim().parse::<i16>().map_err(|_| {
                                FinalizationCommitError::PositionRating {
                                    value: r.to_string(),
                                }
                            })
                        })
                        .transpose()?;
                    query.bind(rating)
                }
                CheckInKind::Assignment | CheckInKind::Aspiration => {
                    query.bind(stamp.official_rating.as_deref())
                }
            };

            let result = query
                .bind(&stamp.shared_notes)
                .bind(snapshot.created_by_teammate_id)
                .bind(created.id)
                .bind(snapshot.employee_teammate_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                tracing::warn!(
                    kind = stamp.kind.as_str(),
                    check_in_id = stamp.check_in_id,
                    "Finalization rolled back: check-in no longer open"
                );
                return Err(FinalizationCommitError::Stale {
                    kind: stamp.kind,
                    check_in_id: stamp.check_in_id,
                });
            }
        }

        tx.commit().await?;
        Ok(created)
    }
}
