//! Repository for the `abilities` table.

use sqlx::PgPool;
use maap_core::forms::AbilityForm;
use maap_core::types::DbId;
use maap_core::versioning::SemanticVersion;

use crate::models::ability::Ability;

/// Column list for abilities queries.
const COLUMNS: &str = "id, organization_id, name, description, semantic_version, \
    milestone_1_description, milestone_2_description, milestone_3_description, \
    milestone_4_description, milestone_5_description, created_by_teammate_id, \
    updated_by_teammate_id, created_at, updated_at";

/// Provides CRUD operations for abilities.
pub struct AbilityRepo;

impl AbilityRepo {
    /// List an organization's abilities ordered by name.
    pub async fn list_for_organization(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Ability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM abilities WHERE organization_id = $1 ORDER BY name ASC, id ASC"
        );
        sqlx::query_as::<_, Ability>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Find an ability within an organization.
    pub async fn find_in_organization(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<Ability>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM abilities WHERE id = $1 AND organization_id = $2");
        sqlx::query_as::<_, Ability>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a validated ability at `version`.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        form: &AbilityForm,
        version: SemanticVersion,
        actor_teammate_id: DbId,
    ) -> Result<Ability, sqlx::Error> {
        let [m1, m2, m3, m4, m5] = form.milestone_descriptions();
        let query = format!(
            "INSERT INTO abilities
                (organization_id, name, description, semantic_version,
                 milestone_1_description, milestone_2_description, milestone_3_description,
                 milestone_4_description, milestone_5_description,
                 created_by_teammate_id, updated_by_teammate_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ability>(&query)
            .bind(organization_id)
            .bind(form.name.trim())
            .bind(form.description.trim())
            .bind(version.to_string())
            .bind(m1)
            .bind(m2)
            .bind(m3)
            .bind(m4)
            .bind(m5)
            .bind(actor_teammate_id)
            .fetch_one(pool)
            .await
    }

    /// Overwrite an ability with a validated form, moving it from `from` to
    /// the bumped `to` version.
    ///
    /// Returns `None` when the stored version is no longer `from`, i.e. a
    /// concurrent edit landed first.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        form: &AbilityForm,
        from: SemanticVersion,
        to: SemanticVersion,
        actor_teammate_id: DbId,
    ) -> Result<Option<Ability>, sqlx::Error> {
        let [m1, m2, m3, m4, m5] = form.milestone_descriptions();
        let query = format!(
            "UPDATE abilities SET
                name = $2, description = $3, semantic_version = $4,
                milestone_1_description = $5, milestone_2_description = $6,
                milestone_3_description = $7, milestone_4_description = $8,
                milestone_5_description = $9, updated_by_teammate_id = $10
             WHERE id = $1 AND semantic_version = $11
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ability>(&query)
            .bind(id)
            .bind(form.name.trim())
            .bind(form.description.trim())
            .bind(to.to_string())
            .bind(m1)
            .bind(m2)
            .bind(m3)
            .bind(m4)
            .bind(m5)
            .bind(actor_teammate_id)
            .bind(from.to_string())
            .fetch_optional(pool)
            .await
    }
}
