//! Durable record of MAAP notifications.
//!
//! [`EventPersistence`] subscribes to the bus and writes every
//! `observation.published` and `maap_snapshot.finalized` notification to the
//! `events` table. It runs as a background task, so request handlers never
//! wait on it, and exits once every sender has been dropped.
//!
//! Event types are resolved against `event_types` once and cached. A failed
//! write of a critical type (a finalized snapshot) is retried once before it
//! is reported.

use std::collections::HashMap;

use tokio::sync::broadcast;
use maap_core::types::DbId;
use maap_db::models::event::EventType;
use maap_db::repositories::EventRepo;
use maap_db::DbPool;

use crate::bus::PlatformEvent;

/// Why an event could not be written.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Event type '{0}' is not registered")]
    UnknownType(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Counts reported when the persistence loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistenceStats {
    pub persisted: u64,
    pub skipped: u64,
    pub failed: u64,
}

pub struct EventPersistence {
    pool: DbPool,
    types: HashMap<String, EventType>,
}

impl EventPersistence {
    /// Persist events from `receiver` until the channel closes.
    pub async fn run(
        pool: DbPool,
        mut receiver: broadcast::Receiver<PlatformEvent>,
    ) -> PersistenceStats {
        let mut persistence = Self {
            pool,
            types: HashMap::new(),
        };
        let mut stats = PersistenceStats::default();

        loop {
            match receiver.recv().await {
                Ok(event) => match persistence.record(&event).await {
                    Ok(event_id) => {
                        stats.persisted += 1;
                        tracing::debug!(
                            event_id,
                            event_type = %event.event_type,
                            source_id = ?event.source_entity_id,
                            "Event recorded"
                        );
                    }
                    Err(PersistError::UnknownType(name)) => {
                        stats.skipped += 1;
                        tracing::warn!(event_type = %name, "Skipping unregistered event type");
                    }
                    Err(PersistError::Database(e)) => {
                        stats.failed += 1;
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            source_id = ?event.source_entity_id,
                            "Failed to persist event"
                        );
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    stats.failed += n;
                    tracing::warn!(skipped = n, "Event persistence lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(
                        persisted = stats.persisted,
                        skipped = stats.skipped,
                        failed = stats.failed,
                        "Event bus closed, persistence shutting down"
                    );
                    break;
                }
            }
        }

        stats
    }

    /// Write one event, retrying once for critical types.
    async fn record(&mut self, event: &PlatformEvent) -> Result<DbId, PersistError> {
        let event_type = self.event_type(&event.event_type).await?;

        match self.insert(&event_type, event).await {
            Err(e) if event_type.is_critical => {
                tracing::warn!(
                    error = %e,
                    event_type = %event_type.name,
                    "Retrying critical event"
                );
                Ok(self.insert(&event_type, event).await?)
            }
            other => Ok(other?),
        }
    }

    async fn insert(&self, event_type: &EventType, event: &PlatformEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            &self.pool,
            event_type.id,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_person_id,
            &event.payload,
        )
        .await
    }

    async fn event_type(&mut self, name: &str) -> Result<EventType, PersistError> {
        if let Some(cached) = self.types.get(name) {
            return Ok(cached.clone());
        }
        let found = EventRepo::get_event_type_by_name(&self.pool, name)
            .await?
            .ok_or_else(|| PersistError::UnknownType(name.to_string()))?;
        self.types.insert(name.to_string(), found.clone());
        Ok(found)
    }
}
