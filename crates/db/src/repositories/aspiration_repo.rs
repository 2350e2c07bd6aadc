//! Repository for the `aspirations` table.

use sqlx::PgPool;
use maap_core::types::DbId;

use crate::models::aspiration::{Aspiration, CreateAspiration};

/// Column list for aspirations queries.
const COLUMNS: &str = "id, organization_id, name, description, sort_order, created_at, updated_at";

pub struct AspirationRepo;

impl AspirationRepo {
    pub async fn create(pool: &PgPool, input: &CreateAspiration) -> Result<Aspiration, sqlx::Error> {
        let query = format!(
            "INSERT INTO aspirations (organization_id, name, description, sort_order)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Aspiration>(&query)
            .bind(input.organization_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// List an organization's aspirations in display order.
    pub async fn list_for_organization(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Aspiration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM aspirations
             WHERE organization_id = $1
             ORDER BY sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, Aspiration>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }
}
