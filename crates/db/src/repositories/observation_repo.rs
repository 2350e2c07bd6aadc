//! Repository for `observations`, `observees`, and `observation_ratings`.

use std::collections::HashMap;

use sqlx::PgPool;
use maap_core::observation::PrivacyLevel;
use maap_core::types::DbId;

use crate::models::observation::{
    CreateObservation, Observation, ObservationDetail, ObservationRating, ObserveeRow,
};

/// Column list for observations queries.
const COLUMNS: &str = "id, observer_person_id, company_id, title, story, primary_feeling, \
    privacy_level, observed_at, published_at, deleted_at, created_at, updated_at";

/// Column list for observation_ratings queries.
const RATING_COLUMNS: &str =
    "id, observation_id, rateable_type, rateable_id, rating, created_at, updated_at";

/// Provides observation CRUD, soft delete, and detail loading.
pub struct ObservationRepo;

impl ObservationRepo {
    /// Insert an observation with its observees and ratings in one
    /// transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateObservation,
    ) -> Result<ObservationDetail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO observations
                (observer_person_id, company_id, title, story, primary_feeling,
                 privacy_level, observed_at, published_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let observation = sqlx::query_as::<_, Observation>(&insert)
            .bind(input.observer_person_id)
            .bind(input.company_id)
            .bind(&input.title)
            .bind(&input.story)
            .bind(&input.primary_feeling)
            .bind(input.privacy_level.as_str())
            .bind(input.observed_at)
            .bind(input.published_at)
            .fetch_one(&mut *tx)
            .await?;

        let mut observee_ids = input.observee_teammate_ids.clone();
        observee_ids.sort_unstable();
        observee_ids.dedup();
        for teammate_id in &observee_ids {
            sqlx::query("INSERT INTO observees (observation_id, teammate_id) VALUES ($1, $2)")
                .bind(observation.id)
                .bind(teammate_id)
                .execute(&mut *tx)
                .await?;
        }

        let rating_insert = format!(
            "INSERT INTO observation_ratings (observation_id, rateable_type, rateable_id, rating)
             VALUES ($1, $2, $3, $4)
             RETURNING {RATING_COLUMNS}"
        );
        let mut ratings = Vec::with_capacity(input.ratings.len());
        for (rateable, value) in &input.ratings {
            let rating = sqlx::query_as::<_, ObservationRating>(&rating_insert)
                .bind(observation.id)
                .bind(rateable.kind().as_str())
                .bind(rateable.id())
                .bind(value.as_str())
                .fetch_one(&mut *tx)
                .await?;
            ratings.push(rating);
        }

        tx.commit().await?;
        Ok(ObservationDetail {
            observation,
            observee_teammate_ids: observee_ids,
            ratings,
        })
    }

    /// Find an observation by ID, including soft-deleted ones.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Observation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM observations WHERE id = $1");
        sqlx::query_as::<_, Observation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an observation with observees and ratings, including
    /// soft-deleted ones.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ObservationDetail>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(observation) => Ok(Self::attach(pool, vec![observation]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Every non-deleted observation of a company, newest observed first.
    /// Visibility is applied by the caller.
    pub async fn list_details_for_company(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<Vec<ObservationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM observations
             WHERE company_id = $1 AND deleted_at IS NULL
             ORDER BY observed_at DESC, id DESC"
        );
        let observations = sqlx::query_as::<_, Observation>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await?;
        Self::attach(pool, observations).await
    }

    /// Published, non-deleted `public_to_world` observations of a company.
    pub async fn list_public_for_company(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<Vec<ObservationDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM observations
             WHERE company_id = $1
               AND deleted_at IS NULL
               AND published_at IS NOT NULL
               AND privacy_level = $2
             ORDER BY observed_at DESC, id DESC"
        );
        let observations = sqlx::query_as::<_, Observation>(&query)
            .bind(company_id)
            .bind(PrivacyLevel::PublicToWorld.as_str())
            .fetch_all(pool)
            .await?;
        Self::attach(pool, observations).await
    }

    /// Publish a draft at `privacy_level`. Re-publishing keeps the first
    /// `published_at`. Returns `None` for missing or deleted observations.
    pub async fn publish(
        pool: &PgPool,
        id: DbId,
        privacy_level: PrivacyLevel,
    ) -> Result<Option<Observation>, sqlx::Error> {
        let query = format!(
            "UPDATE observations SET
                published_at = COALESCE(published_at, NOW()),
                privacy_level = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Observation>(&query)
            .bind(id)
            .bind(privacy_level.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete. Returns `false` if already deleted or missing.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE observations SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Undo a soft delete. Returns `false` if not deleted or missing.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE observations SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load observees and ratings for a batch of observations, keeping the
    /// input order.
    async fn attach(
        pool: &PgPool,
        observations: Vec<Observation>,
    ) -> Result<Vec<ObservationDetail>, sqlx::Error> {
        let ids: Vec<DbId> = observations.iter().map(|o| o.id).collect();

        let observees = sqlx::query_as::<_, ObserveeRow>(
            "SELECT observation_id, teammate_id FROM observees
             WHERE observation_id = ANY($1)
             ORDER BY teammate_id ASC",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let rating_query = format!(
            "SELECT {RATING_COLUMNS} FROM observation_ratings
             WHERE observation_id = ANY($1)
             ORDER BY id ASC"
        );
        let ratings = sqlx::query_as::<_, ObservationRating>(&rating_query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut observees_by_id: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for row in observees {
            observees_by_id
                .entry(row.observation_id)
                .or_default()
                .push(row.teammate_id);
        }
        let mut ratings_by_id: HashMap<DbId, Vec<ObservationRating>> = HashMap::new();
        for rating in ratings {
            ratings_by_id
                .entry(rating.observation_id)
                .or_default()
                .push(rating);
        }

        Ok(observations
            .into_iter()
            .map(|observation| ObservationDetail {
                observee_teammate_ids: observees_by_id.remove(&observation.id).unwrap_or_default(),
                ratings: ratings_by_id.remove(&observation.id).unwrap_or_default(),
                observation,
            })
            .collect())
    }
}
