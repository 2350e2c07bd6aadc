//! Observation ("kudos") vocabulary: privacy levels, ratings, rateables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/* --------------------------------------------------------------------------
Privacy levels
-------------------------------------------------------------------------- */

/// Who may see a published observation, ordered narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyLevel {
    ObserverOnly,
    ObservedOnly,
    ManagersOnly,
    ObservedAndManagers,
    PublicToCompany,
    PublicToWorld,
}

impl PrivacyLevel {
    pub const ALL: [PrivacyLevel; 6] = [
        PrivacyLevel::ObserverOnly,
        PrivacyLevel::ObservedOnly,
        PrivacyLevel::ManagersOnly,
        PrivacyLevel::ObservedAndManagers,
        PrivacyLevel::PublicToCompany,
        PrivacyLevel::PublicToWorld,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObserverOnly => "observer_only",
            Self::ObservedOnly => "observed_only",
            Self::ManagersOnly => "managers_only",
            Self::ObservedAndManagers => "observed_and_managers",
            Self::PublicToCompany => "public_to_company",
            Self::PublicToWorld => "public_to_world",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid privacy level '{s}'. Must be one of: {}",
                    Self::ALL.map(|l| l.as_str()).join(", ")
                )
            })
    }

    /// Observees can see observations at this level.
    pub fn includes_observees(&self) -> bool {
        matches!(self, Self::ObservedOnly | Self::ObservedAndManagers)
    }

    /// Managers of the observees can see observations at this level.
    pub fn includes_managers(&self) -> bool {
        matches!(self, Self::ManagersOnly | Self::ObservedAndManagers)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::PublicToCompany | Self::PublicToWorld)
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* --------------------------------------------------------------------------
Ratings
-------------------------------------------------------------------------- */

/// Rating an observation gives against a rateable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationRatingValue {
    StronglyDisagree,
    Disagree,
    Na,
    Agree,
    StronglyAgree,
}

impl ObservationRatingValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StronglyDisagree => "strongly_disagree",
            Self::Disagree => "disagree",
            Self::Na => "na",
            Self::Agree => "agree",
            Self::StronglyAgree => "strongly_agree",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            "strongly_disagree" => Ok(Self::StronglyDisagree),
            "disagree" => Ok(Self::Disagree),
            "na" => Ok(Self::Na),
            "agree" => Ok(Self::Agree),
            "strongly_agree" => Ok(Self::StronglyAgree),
            _ => Err(format!("Invalid observation rating '{s}'")),
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::StronglyDisagree | Self::Disagree)
    }
}

/* --------------------------------------------------------------------------
Rateables
-------------------------------------------------------------------------- */

/// Discriminator of a [`Rateable`] as stored in `rateable_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RateableType {
    Assignment,
    Ability,
    Aspiration,
}

impl RateableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "Assignment",
            Self::Ability => "Ability",
            Self::Aspiration => "Aspiration",
        }
    }

    /// Accepts both the stored form (`Assignment`) and lower case.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "assignment" => Ok(Self::Assignment),
            "ability" => Ok(Self::Ability),
            "aspiration" => Ok(Self::Aspiration),
            _ => Err(format!(
                "Invalid rateable type '{s}'. Must be one of: Assignment, Ability, Aspiration"
            )),
        }
    }
}

/// Something an observation can rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "rateable_type", content = "rateable_id")]
pub enum Rateable {
    Assignment(DbId),
    Ability(DbId),
    Aspiration(DbId),
}

impl Rateable {
    pub fn new(kind: RateableType, id: DbId) -> Self {
        match kind {
            RateableType::Assignment => Self::Assignment(id),
            RateableType::Ability => Self::Ability(id),
            RateableType::Aspiration => Self::Aspiration(id),
        }
    }

    pub fn kind(&self) -> RateableType {
        match self {
            Self::Assignment(_) => RateableType::Assignment,
            Self::Ability(_) => RateableType::Ability,
            Self::Aspiration(_) => RateableType::Aspiration,
        }
    }

    pub fn id(&self) -> DbId {
        match self {
            Self::Assignment(id) | Self::Ability(id) | Self::Aspiration(id) => *id,
        }
    }
}

/* --------------------------------------------------------------------------
Publishing rules
-------------------------------------------------------------------------- */

/// Maximum length of an observation story.
pub const MAX_STORY_LENGTH: usize = 10_000;

/// Privacy level an observation is published at.
///
/// A public observation carrying any negative rating is narrowed to
/// `observed_and_managers`.
pub fn effective_privacy_on_publish(
    requested: PrivacyLevel,
    ratings: &[ObservationRatingValue],
) -> PrivacyLevel {
    if requested.is_public() && ratings.iter().any(ObservationRatingValue::is_negative) {
        PrivacyLevel::ObservedAndManagers
    } else {
        requested
    }
}
