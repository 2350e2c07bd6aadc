//! Events published on the bus end up in the `events` table.

use sqlx::PgPool;
use maap_core::observation::PrivacyLevel;
use maap_db::models::person::CreatePerson;
use maap_db::repositories::{EventRepo, PersonRepo};
use maap_events::{EventBus, EventPersistence, PersistenceStats, PlatformEvent};

#[sqlx::test(migrations = "../../db/migrations")]
async fn published_events_are_persisted(pool: PgPool) {
    let actor = PersonRepo::create(
        &pool,
        &CreatePerson {
            email: "observer@acme.test".into(),
            full_name: "Observer".into(),
            password_hash: None,
        },
    )
    .await
    .unwrap();

    let bus = EventBus::default();
    let task = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(PlatformEvent::observation_published(
        41,
        actor.id,
        PrivacyLevel::PublicToCompany,
        PrivacyLevel::PublicToCompany,
    ));
    // Unknown event types are logged and skipped.
    bus.publish(PlatformEvent::new("nothing.registered").with_source("observation", 41));

    bus.publish(PlatformEvent::maap_snapshot_finalized(7, actor.id, 3, 2));

    drop(bus);
    let stats = task.await.unwrap();
    assert_eq!(
        stats,
        PersistenceStats {
            persisted: 2,
            skipped: 1,
            failed: 0
        }
    );

    let events = EventRepo::list_for_source(&pool, "observation", 41).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].actor_person_id, Some(actor.id));
    assert_eq!(events[0].payload["privacy_level"], "public_to_company");
    assert_eq!(events[0].payload["narrowed"], false);
}
