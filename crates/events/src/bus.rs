//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the API state. Handlers
//! publish after their database work has committed; nothing on the request
//! path waits for subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use maap_core::observation::PrivacyLevel;
use maap_core::types::DbId;

/// Raised when an observation goes from draft to published.
pub const OBSERVATION_PUBLISHED: &str = "observation.published";

/// Raised when check-ins are finalized into a MAAP snapshot.
pub const MAAP_SNAPSHOT_FINALIZED: &str = "maap_snapshot.finalized";

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event.
///
/// Built with [`PlatformEvent::new`] plus [`with_source`](Self::with_source),
/// [`with_actor`](Self::with_actor) and [`with_payload`](Self::with_payload),
/// or with one of the named constructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"observation.published"`.
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    /// Person whose request raised the event.
    pub actor_person_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_person_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, person_id: DbId) -> Self {
        self.actor_person_id = Some(person_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// An observation was published at `privacy_level`.
    ///
    /// `requested` differs from `privacy_level` when publishing narrowed a
    /// public observation that carried negative ratings.
    pub fn observation_published(
        observation_id: DbId,
        actor_person_id: DbId,
        privacy_level: PrivacyLevel,
        requested: PrivacyLevel,
    ) -> Self {
        Self::new(OBSERVATION_PUBLISHED)
            .with_source("observation", observation_id)
            .with_actor(actor_person_id)
            .with_payload(serde_json::json!({
                "privacy_level": privacy_level,
                "requested_privacy_level": requested,
                "narrowed": privacy_level != requested,
            }))
    }

    /// Check-ins of `employee_teammate_id` were finalized into a snapshot.
    pub fn maap_snapshot_finalized(
        snapshot_id: DbId,
        actor_person_id: DbId,
        employee_teammate_id: DbId,
        finalized_check_ins: usize,
    ) -> Self {
        Self::new(MAAP_SNAPSHOT_FINALIZED)
            .with_source("maap_snapshot", snapshot_id)
            .with_actor(actor_person_id)
            .with_payload(serde_json::json!({
                "employee_teammate_id": employee_teammate_id,
                "finalized_check_ins": finalized_check_ins,
            }))
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use maap_events::bus::{EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new("observation.published"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers see `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if there are none.
    pub fn publish(&self, event: PlatformEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers, e.g. the notification recorder.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
