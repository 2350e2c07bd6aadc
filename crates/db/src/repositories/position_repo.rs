//! Repository for the `positions` table.

use sqlx::PgPool;
use maap_core::forms::PositionForm;
use maap_core::types::DbId;
use maap_core::versioning::SemanticVersion;

use crate::models::position::Position;

/// Column list for positions queries.
const COLUMNS: &str =
    "id, organization_id, title, description, semantic_version, created_at, updated_at";

/// Provides CRUD operations for positions.
pub struct PositionRepo;

impl PositionRepo {
    pub async fn list_for_organization(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Position>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM positions WHERE organization_id = $1 ORDER BY title ASC, id ASC"
        );
        sqlx::query_as::<_, Position>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_in_organization(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<Position>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM positions WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, Position>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        form: &PositionForm,
        version: SemanticVersion,
    ) -> Result<Position, sqlx::Error> {
        let query = format!(
            "INSERT INTO positions (organization_id, title, description, semantic_version)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Position>(&query)
            .bind(organization_id)
            .bind(form.title.trim())
            .bind(form.description.trim())
            .bind(version.to_string())
            .fetch_one(pool)
            .await
    }

    /// `None` when the stored version is no longer `from`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        form: &PositionForm,
        from: SemanticVersion,
        to: SemanticVersion,
    ) -> Result<Option<Position>, sqlx::Error> {
        let query = format!(
            "UPDATE positions SET title = $2, description = $3, semantic_version = $4
             WHERE id = $1 AND semantic_version = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Position>(&query)
            .bind(id)
            .bind(form.title.trim())
            .bind(form.description.trim())
            .bind(to.to_string())
            .bind(from.to_string())
            .fetch_optional(pool)
            .await
    }
}
