//! Repository for the `teammates` table and membership lookups.

use sqlx::PgPool;
use maap_core::types::DbId;

use crate::models::teammate::{CreateTeammate, MembershipRow, Teammate};

/// Column list for teammates queries.
const COLUMNS: &str = "id, person_id, organization_id, can_manage_employment, \
    can_create_employment, can_manage_maap, first_employed_at, last_terminated_at, \
    created_at, updated_at";

/// Column list for membership queries (teammate row plus its root company).
const MEMBERSHIP_COLUMNS: &str = "t.id AS teammate_id, t.person_id, t.organization_id, \
    COALESCE(root_organization_id(t.organization_id), t.organization_id) AS company_id, \
    t.can_manage_employment, t.can_create_employment, t.can_manage_maap, \
    t.first_employed_at, t.last_terminated_at";

/// Provides teammate CRUD and the membership views used for authorization.
pub struct TeammateRepo;

impl TeammateRepo {
    /// Insert a new teammate, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTeammate) -> Result<Teammate, sqlx::Error> {
        let query = format!(
            "INSERT INTO teammates
                (person_id, organization_id, can_manage_employment,
                 can_create_employment, can_manage_maap, first_employed_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Teammate>(&query)
            .bind(input.person_id)
            .bind(input.organization_id)
            .bind(input.can_manage_employment)
            .bind(input.can_create_employment)
            .bind(input.can_manage_maap)
            .bind(input.first_employed_at)
            .fetch_one(pool)
            .await
    }

    /// Find a teammate by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Teammate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teammates WHERE id = $1");
        sqlx::query_as::<_, Teammate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Stamp a termination, ending active employment.
    pub async fn terminate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE teammates SET last_terminated_at = NOW()
             WHERE id = $1 AND last_terminated_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Membership of a teammate, by teammate ID.
    pub async fn membership(
        pool: &PgPool,
        teammate_id: DbId,
    ) -> Result<Option<MembershipRow>, sqlx::Error> {
        let query = format!("SELECT {MEMBERSHIP_COLUMNS} FROM teammates t WHERE t.id = $1");
        sqlx::query_as::<_, MembershipRow>(&query)
            .bind(teammate_id)
            .fetch_optional(pool)
            .await
    }

    /// A person's membership acting in `organization_id`.
    ///
    /// Matches a teammate of the organization itself first, then any
    /// teammate of the same root company (a person employed by a department
    /// acts for the whole company).
    pub async fn acting_membership(
        pool: &PgPool,
        person_id: DbId,
        organization_id: DbId,
    ) -> Result<Option<MembershipRow>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM teammates t
             WHERE t.person_id = $1
               AND COALESCE(root_organization_id(t.organization_id), t.organization_id)
                   = COALESCE(root_organization_id($2), $2)
             ORDER BY (t.organization_id = $2) DESC,
                      (t.first_employed_at IS NOT NULL AND t.last_terminated_at IS NULL) DESC,
                      t.id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, MembershipRow>(&query)
            .bind(person_id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Every membership a person holds, across companies.
    pub async fn memberships_for_person(
        pool: &PgPool,
        person_id: DbId,
    ) -> Result<Vec<MembershipRow>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM teammates t
             WHERE t.person_id = $1
             ORDER BY t.id ASC"
        );
        sqlx::query_as::<_, MembershipRow>(&query)
            .bind(person_id)
            .fetch_all(pool)
            .await
    }

    /// `(teammate_id, manager_teammate_id)` pairs from the active tenures of
    /// a company's teammates.
    pub async fn manager_pairs(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT et.teammate_id, et.manager_teammate_id
             FROM employment_tenures et
             JOIN teammates t ON t.id = et.teammate_id
             WHERE et.ended_at IS NULL
               AND et.manager_teammate_id IS NOT NULL
               AND COALESCE(root_organization_id(t.organization_id), t.organization_id) = $1",
        )
        .bind(company_id)
        .fetch_all(pool)
        .await
    }
}
