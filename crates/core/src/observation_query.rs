//! Observation feed filtering, sorting, and spotlight statistics.
//!
//! The API layer loads the observations a viewer can see in an organization
//! and hands them to [`ObservationQuery::apply`]. Raw query-string values are
//! resolved leniently: unknown enum values fall back to defaults and
//! malformed dates are ignored.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::observation::{ObservationRatingValue, PrivacyLevel, Rateable, RateableType};
use crate::types::{DbId, Timestamp};

/// Name of the bundled "kudos" preset.
pub const PRESET_KUDOS: &str = "kudos";

/* --------------------------------------------------------------------------
Feed rows
-------------------------------------------------------------------------- */

/// One observation as seen by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedObservation {
    pub id: DbId,
    pub title: Option<String>,
    pub story: String,
    pub observer_person_id: DbId,
    pub observee_teammate_ids: Vec<DbId>,
    pub privacy_level: PrivacyLevel,
    pub observed_at: Timestamp,
    pub created_at: Timestamp,
    pub ratings: Vec<(Rateable, ObservationRatingValue)>,
}

impl FeedObservation {
    fn sort_title(&self) -> String {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.story)
            .to_lowercase()
    }
}

/* --------------------------------------------------------------------------
Query vocabulary
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Table,
    Wall,
    List,
}

impl View {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "table" => Some(Self::Table),
            "wall" => Some(Self::Wall),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotlightKind {
    MostObserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// No lower bound.
    #[default]
    Now,
    ThisWeek,
    ThisMonth,
    Last45Days,
    ThisQuarter,
    Last90Days,
    ThisYear,
    /// Bounded by `start_date`/`end_date` only.
    Between,
}

impl Timeframe {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "now" => Some(Self::Now),
            "this_week" => Some(Self::ThisWeek),
            "this_month" => Some(Self::ThisMonth),
            "last_45_days" => Some(Self::Last45Days),
            "this_quarter" => Some(Self::ThisQuarter),
            "last_90_days" => Some(Self::Last90Days),
            "this_year" => Some(Self::ThisYear),
            "between" => Some(Self::Between),
            _ => None,
        }
    }

    /// Earliest `observed_at` included, relative to `now` (UTC).
    pub fn lower_bound(&self, now: Timestamp) -> Option<Timestamp> {
        let today = now.date_naive();
        let start_of = |date: NaiveDate| -> Option<Timestamp> {
            Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
        };
        match self {
            Self::Now | Self::Between => None,
            Self::ThisWeek => {
                let offset = i64::from(today.weekday().num_days_from_monday());
                start_of(today - Duration::days(offset))
            }
            Self::ThisMonth => start_of(today.with_day(1)?),
            Self::Last45Days => Some(now - Duration::days(45)),
            Self::ThisQuarter => {
                let first_month = (today.month0() / 3) * 3 + 1;
                start_of(NaiveDate::from_ymd_opt(today.year(), first_month, 1)?)
            }
            Self::Last90Days => Some(now - Duration::days(90)),
            Self::ThisYear => start_of(NaiveDate::from_ymd_opt(today.year(), 1, 1)?),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    ObservedAtDesc,
    RatingsCountDesc,
    Title,
    CreatedAt,
}

impl SortOrder {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "observed_at_desc" => Some(Self::ObservedAtDesc),
            "ratings_count_desc" => Some(Self::RatingsCountDesc),
            "title" => Some(Self::Title),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/* --------------------------------------------------------------------------
Params
-------------------------------------------------------------------------- */

/// Raw query-string parameters. Multi-value fields are comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservationQueryParams {
    pub preset: Option<String>,
    pub view: Option<String>,
    pub spotlight: Option<String>,
    pub timeframe: Option<String>,
    pub privacy: Option<String>,
    pub rateable_type: Option<String>,
    pub rateable_id: Option<DbId>,
    pub observee_ids: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
}

/// Resolved query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ObservationQuery {
    pub preset: Option<String>,
    pub view: View,
    pub spotlight: Option<SpotlightKind>,
    pub timeframe: Timeframe,
    pub privacy: Vec<PrivacyLevel>,
    pub rateable: Option<Rateable>,
    pub observee_ids: Vec<DbId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort: SortOrder,
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()
}

fn split_csv(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl ObservationQuery {
    /// The fixed "kudos" bundle.
    pub fn kudos() -> Self {
        Self {
            preset: Some(PRESET_KUDOS.to_string()),
            view: View::Wall,
            spotlight: Some(SpotlightKind::MostObserved),
            timeframe: Timeframe::Last45Days,
            privacy: vec![PrivacyLevel::PublicToCompany, PrivacyLevel::PublicToWorld],
            ..Self::default()
        }
    }

    /// Resolve raw params. A known preset replaces every manually set value.
    pub fn from_params(params: &ObservationQueryParams) -> Self {
        if params.preset.as_deref() == Some(PRESET_KUDOS) {
            return Self::kudos();
        }

        let mut privacy: Vec<PrivacyLevel> = split_csv(params.privacy.as_deref())
            .filter_map(|s| PrivacyLevel::from_str_value(s).ok())
            .collect();
        privacy.sort();
        privacy.dedup();

        let rateable = match (params.rateable_type.as_deref(), params.rateable_id) {
            (Some(kind), Some(id)) => RateableType::from_str_value(kind)
                .ok()
                .map(|k| Rateable::new(k, id)),
            _ => None,
        };

        Self {
            preset: None,
            view: params.view.as_deref().and_then(View::parse).unwrap_or_default(),
            spotlight: match params.spotlight.as_deref() {
                Some("most_observed") => Some(SpotlightKind::MostObserved),
                _ => None,
            },
            timeframe: params
                .timeframe
                .as_deref()
                .and_then(Timeframe::parse)
                .unwrap_or_default(),
            privacy,
            rateable,
            observee_ids: split_csv(params.observee_ids.as_deref())
                .filter_map(|s| s.parse().ok())
                .collect(),
            start_date: parse_date(params.start_date.as_deref()),
            end_date: parse_date(params.end_date.as_deref()),
            sort: params.sort.as_deref().and_then(SortOrder::parse).unwrap_or_default(),
        }
    }

    fn matches(&self, o: &FeedObservation, lower_bound: Option<Timestamp>) -> bool {
        if lower_bound.is_some_and(|bound| o.observed_at < bound) {
            return false;
        }
        let day = o.observed_at.date_naive();
        if self.start_date.is_some_and(|start| day < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| day > end) {
            return false;
        }
        if !self.privacy.is_empty() && !self.privacy.contains(&o.privacy_level) {
            return false;
        }
        if let Some(rateable) = self.rateable {
            if !o.ratings.iter().any(|(r, _)| *r == rateable) {
                return false;
            }
        }
        if !self.observee_ids.is_empty()
            && !o
                .observee_teammate_ids
                .iter()
                .any(|id| self.observee_ids.contains(id))
        {
            return false;
        }
        true
    }

    /// Filter and sort.
    pub fn apply(&self, observations: Vec<FeedObservation>, now: Timestamp) -> Vec<FeedObservation> {
        let lower_bound = self.timeframe.lower_bound(now);
        let mut kept: Vec<FeedObservation> = observations
            .into_iter()
            .filter(|o| self.matches(o, lower_bound))
            .collect();

        match self.sort {
            SortOrder::ObservedAtDesc => {
                kept.sort_by_key(|o| (Reverse(o.observed_at), Reverse(o.id)));
            }
            SortOrder::RatingsCountDesc => {
                kept.sort_by_key(|o| (Reverse(o.ratings.len()), Reverse(o.observed_at), Reverse(o.id)));
            }
            SortOrder::Title => {
                kept.sort_by_cached_key(|o| (o.sort_title(), o.id));
            }
            SortOrder::CreatedAt => {
                kept.sort_by_key(|o| (Reverse(o.created_at), Reverse(o.id)));
            }
        }
        kept
    }
}

/* --------------------------------------------------------------------------
Spotlight
-------------------------------------------------------------------------- */

/// An id with the number of observations counted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub id: DbId,
    pub count: usize,
}

/// Leader and runner-up of one spotlight category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpotlightCategory {
    pub leader: Option<Ranked>,
    pub runner_up: Option<Ranked>,
}

impl SpotlightCategory {
    /// Rank by count descending; equal counts go to the lowest id.
    fn from_counts(counts: HashMap<DbId, usize>) -> Self {
        let mut ranked: Vec<Ranked> = counts
            .into_iter()
            .map(|(id, count)| Ranked { id, count })
            .collect();
        ranked.sort_by_key(|r| (Reverse(r.count), r.id));
        let mut iter = ranked.into_iter();
        Self {
            leader: iter.next(),
            runner_up: iter.next(),
        }
    }
}

/// "Most observed" statistics over a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpotlightReport {
    pub total_observations: usize,
    pub assignment: SpotlightCategory,
    pub ability: SpotlightCategory,
    pub aspiration: SpotlightCategory,
    /// Most observed teammate.
    pub observee: SpotlightCategory,
    /// Most active observer (person id).
    pub observer: SpotlightCategory,
}

/// Count each subject once per observation that mentions it.
pub fn most_observed(observations: &[FeedObservation]) -> SpotlightReport {
    let mut by_kind: HashMap<RateableType, HashMap<DbId, usize>> = HashMap::new();
    let mut observees: HashMap<DbId, usize> = HashMap::new();
    let mut observers: HashMap<DbId, usize> = HashMap::new();

    for o in observations {
        let mut rated: Vec<Rateable> = o.ratings.iter().map(|(r, _)| *r).collect();
        rated.sort();
        rated.dedup();
        for r in rated {
            *by_kind.entry(r.kind()).or_default().entry(r.id()).or_default() += 1;
        }

        let mut seen: Vec<DbId> = o.observee_teammate_ids.clone();
        seen.sort_unstable();
        seen.dedup();
        for id in seen {
            *observees.entry(id).or_default() += 1;
        }

        *observers.entry(o.observer_person_id).or_default() += 1;
    }

    let mut category = |kind: RateableType| SpotlightCategory::from_counts(by_kind.remove(&kind).unwrap_or_default());

    SpotlightReport {
        total_observations: observations.len(),
        assignment: category(RateableType::Assignment),
        ability: category(RateableType::Ability),
        aspiration: category(RateableType::Aspiration),
        observee: SpotlightCategory::from_counts(observees),
        observer: SpotlightCategory::from_counts(observers),
    }
}
