//! Repository for the `employment_tenures` table.

use sqlx::PgPool;
use maap_core::types::DbId;

use crate::models::employment_tenure::{CreateEmploymentTenure, EmploymentTenure};

/// Column list for employment_tenures queries.
const COLUMNS: &str = "id, teammate_id, position_id, manager_teammate_id, started_at, \
    ended_at, created_at, updated_at";

pub struct EmploymentTenureRepo;

impl EmploymentTenureRepo {
    /// Start a tenure, ending the teammate's current one in the same
    /// transaction.
    pub async fn start(
        pool: &PgPool,
        input: &CreateEmploymentTenure,
    ) -> Result<EmploymentTenure, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE employment_tenures SET ended_at = NOW()
             WHERE teammate_id = $1 AND ended_at IS NULL",
        )
        .bind(input.teammate_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO employment_tenures
                (teammate_id, position_id, manager_teammate_id, started_at)
             VALUES ($1, $2, $3, COALESCE($4, NOW()))
             RETURNING {COLUMNS}"
        );
        let tenure = sqlx::query_as::<_, EmploymentTenure>(&query)
            .bind(input.teammate_id)
            .bind(input.position_id)
            .bind(input.manager_teammate_id)
            .bind(input.started_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(tenure)
    }

    /// The teammate's current tenure, if any.
    pub async fn find_active(
        pool: &PgPool,
        teammate_id: DbId,
    ) -> Result<Option<EmploymentTenure>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM employment_tenures
             WHERE teammate_id = $1 AND ended_at IS NULL"
        );
        sqlx::query_as::<_, EmploymentTenure>(&query)
            .bind(teammate_id)
            .fetch_optional(pool)
            .await
    }
}
