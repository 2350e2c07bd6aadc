//! Repository for the `organizations` table.

use sqlx::PgPool;
use maap_core::types::DbId;

use crate::models::organization::{CreateOrganization, Organization};

/// Column list for organizations queries.
const COLUMNS: &str = "id, name, parent_id, created_at, updated_at";

/// Provides lookups over the organization tree.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert a new organization, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!(
            "INSERT INTO organizations (name, parent_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.name)
            .bind(input.parent_id)
            .fetch_one(pool)
            .await
    }

    /// Find an organization by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The root company of an organization (itself when it has no parent).
    ///
    /// Returns `None` when the organization does not exist.
    pub async fn root_company_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT root_organization_id($1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
