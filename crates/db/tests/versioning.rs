//! Versioned record updates only apply on top of the version they were read at.

mod common;

use maap_core::forms::AssignmentForm;
use maap_core::versioning::SemanticVersion;
use maap_db::repositories::AssignmentRepo;
use sqlx::PgPool;

fn form(tagline: &str) -> AssignmentForm {
    AssignmentForm {
        title: "On-call".into(),
        tagline: tagline.into(),
        ..AssignmentForm::default()
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_applies_on_the_version_it_read(pool: PgPool) {
    let company = common::organization(&pool, "Acme", None).await;
    let v1 = SemanticVersion::new(1, 0, 0);
    let created = AssignmentRepo::create(&pool, company, &form("Keep the lights on"), v1)
        .await
        .unwrap();

    let updated = AssignmentRepo::update(
        &pool,
        created.id,
        &form("Keep the lights on, politely"),
        v1,
        SemanticVersion::new(1, 1, 0),
    )
    .await
    .unwrap()
    .expect("stored version matched");
    assert_eq!(updated.semantic_version, "1.1.0");
    assert_eq!(updated.tagline, "Keep the lights on, politely");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_update_changes_nothing(pool: PgPool) {
    let company = common::organization(&pool, "Acme", None).await;
    let v1 = SemanticVersion::new(1, 0, 0);
    let created = AssignmentRepo::create(&pool, company, &form("Keep the lights on"), v1)
        .await
        .unwrap();

    // A first edit lands.
    AssignmentRepo::update(&pool, created.id, &form("First"), v1, SemanticVersion::new(1, 1, 0))
        .await
        .unwrap()
        .expect("first edit applies");

    // A second edit computed from 1.0.0 must not overwrite the 1.1.0 bump.
    let stale = AssignmentRepo::update(
        &pool,
        created.id,
        &form("Second"),
        v1,
        SemanticVersion::new(1, 1, 0),
    )
    .await
    .unwrap();
    assert!(stale.is_none());

    let stored = AssignmentRepo::find_in_organization(&pool, company, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.semantic_version, "1.1.0");
    assert_eq!(stored.tagline, "First");
    assert_eq!(stored.version(), Ok(SemanticVersion::new(1, 1, 0)));
}
