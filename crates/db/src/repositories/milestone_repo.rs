//! Repository for the `teammate_milestones` table.

use sqlx::PgPool;
use maap_core::types::DbId;

use crate::models::milestone::{CreateTeammateMilestone, TeammateMilestone};

/// Column list for teammate_milestones queries.
const COLUMNS: &str = "id, teammate_id, ability_id, milestone_level, certified_by_teammate_id, \
    attained_at, created_at, updated_at";

pub struct MilestoneRepo;

impl MilestoneRepo {
    /// Record an attained milestone.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTeammateMilestone,
    ) -> Result<TeammateMilestone, sqlx::Error> {
        let query = format!(
            "INSERT INTO teammate_milestones
                (teammate_id, ability_id, milestone_level, certified_by_teammate_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeammateMilestone>(&query)
            .bind(input.teammate_id)
            .bind(input.ability_id)
            .bind(input.milestone_level)
            .bind(input.certified_by_teammate_id)
            .fetch_one(pool)
            .await
    }

    /// A teammate's milestones ordered by ability then level.
    pub async fn list_for_teammate(
        pool: &PgPool,
        teammate_id: DbId,
    ) -> Result<Vec<TeammateMilestone>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM teammate_milestones
             WHERE teammate_id = $1
             ORDER BY ability_id ASC, milestone_level ASC"
        );
        sqlx::query_as::<_, TeammateMilestone>(&query)
            .bind(teammate_id)
            .fetch_all(pool)
            .await
    }
}
