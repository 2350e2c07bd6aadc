//! Observation, observee, and observation-rating models.

use serde::Serialize;
use sqlx::FromRow;
use maap_core::observation::{ObservationRatingValue, PrivacyLevel, Rateable, RateableType};
use maap_core::observation_query::FeedObservation;
use maap_core::types::{DbId, Timestamp};
use maap_core::visibility::ObservationAccess;

/* --------------------------------------------------------------------------
   Rows
   -------------------------------------------------------------------------- */

/// A row from the `observations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Observation {
    pub id: DbId,
    pub observer_person_id: DbId,
    pub company_id: DbId,
    pub title: Option<String>,
    pub story: String,
    pub primary_feeling: Option<String>,
    pub privacy_level: String,
    pub observed_at: Timestamp,
    pub published_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Observation {
    /// The stored privacy level. The column is constrained to the known
    /// set, so an unknown value only appears on a hand-edited row and is
    /// treated as the narrowest level.
    pub fn privacy(&self) -> PrivacyLevel {
        PrivacyLevel::from_str_value(&self.privacy_level).unwrap_or(PrivacyLevel::ObserverOnly)
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A row from the `observation_ratings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ObservationRating {
    pub id: DbId,
    pub observation_id: DbId,
    pub rateable_type: String,
    pub rateable_id: DbId,
    pub rating: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ObservationRating {
    /// Typed rateable and rating; `None` for values outside the known sets.
    pub fn typed(&self) -> Option<(Rateable, ObservationRatingValue)> {
        let kind = RateableType::from_str_value(&self.rateable_type).ok()?;
        let value = ObservationRatingValue::from_str_value(&self.rating).ok()?;
        Some((Rateable::new(kind, self.rateable_id), value))
    }
}

/// An `(observation_id, teammate_id)` pair from `observees`.
#[derive(Debug, Clone, FromRow)]
pub struct ObserveeRow {
    pub observation_id: DbId,
    pub teammate_id: DbId,
}

/* --------------------------------------------------------------------------
   Aggregate
   -------------------------------------------------------------------------- */

/// An observation with its observees and ratings.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationDetail {
    #[serde(flatten)]
    pub observation: Observation,
    pub observee_teammate_ids: Vec<DbId>,
    pub ratings: Vec<ObservationRating>,
}

impl ObservationDetail {
    pub fn access(&self) -> ObservationAccess {
        ObservationAccess {
            observation_id: self.observation.id,
            company_id: self.observation.company_id,
            observer_person_id: self.observation.observer_person_id,
            observee_teammate_ids: self.observee_teammate_ids.clone(),
            privacy_level: self.observation.privacy(),
            published: self.observation.is_published(),
            deleted: self.observation.is_deleted(),
        }
    }

    pub fn feed(&self) -> FeedObservation {
        FeedObservation {
            id: self.observation.id,
            title: self.observation.title.clone(),
            story: self.observation.story.clone(),
            observer_person_id: self.observation.observer_person_id,
            observee_teammate_ids: self.observee_teammate_ids.clone(),
            privacy_level: self.observation.privacy(),
            observed_at: self.observation.observed_at,
            created_at: self.observation.created_at,
            ratings: self.ratings.iter().filter_map(ObservationRating::typed).collect(),
        }
    }

    pub fn rating_values(&self) -> Vec<ObservationRatingValue> {
        self.ratings
            .iter()
            .filter_map(ObservationRating::typed)
            .map(|(_, value)| value)
            .collect()
    }
}

/// Values for a new observation, already validated.
#[derive(Debug, Clone)]
pub struct CreateObservation {
    pub observer_person_id: DbId,
    pub company_id: DbId,
    pub title: Option<String>,
    pub story: String,
    pub primary_feeling: Option<String>,
    pub privacy_level: PrivacyLevel,
    pub observed_at: Timestamp,
    pub published_at: Option<Timestamp>,
    pub observee_teammate_ids: Vec<DbId>,
    pub ratings: Vec<(Rateable, ObservationRatingValue)>,
}
