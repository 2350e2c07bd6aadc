//! Repository for the `assignments` table.

use sqlx::PgPool;
use maap_core::forms::AssignmentForm;
use maap_core::types::DbId;
use maap_core::versioning::SemanticVersion;

use crate::models::assignment::Assignment;

/// Column list for assignments queries.
const COLUMNS: &str = "id, organization_id, title, tagline, required_activities, handbook, \
    semantic_version, created_at, updated_at";

/// Provides CRUD operations for assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// List an organization's assignments ordered by title.
    pub async fn list_for_organization(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments WHERE organization_id = $1 ORDER BY title ASC, id ASC"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Find an assignment within an organization.
    pub async fn find_in_organization(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM assignments WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a validated assignment at `version`.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        form: &AssignmentForm,
        version: SemanticVersion,
    ) -> Result<Assignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO assignments
                (organization_id, title, tagline, required_activities, handbook, semantic_version)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(organization_id)
            .bind(form.title.trim())
            .bind(form.tagline.trim())
            .bind(&form.required_activities)
            .bind(&form.handbook)
            .bind(version.to_string())
            .fetch_one(pool)
            .await
    }

    /// Overwrite an assignment with a validated form, moving it from `from`
    /// to `to`. `None` when the stored version is no longer `from`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        form: &AssignmentForm,
        from: SemanticVersion,
        to: SemanticVersion,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE assignments SET
                title = $2, tagline = $3, required_activities = $4, handbook = $5,
                semantic_version = $6
             WHERE id = $1 AND semantic_version = $7
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(form.title.trim())
            .bind(form.tagline.trim())
            .bind(&form.required_activities)
            .bind(&form.handbook)
            .bind(to.to_string())
            .bind(from.to_string())
            .fetch_optional(pool)
            .await
    }
}
