//! Atomic finalization commit: snapshot insert plus check-in stamps.

mod common;

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use maap_core::check_in::CheckInKind;
use maap_core::finalization::{OfficialStamp, CHANGE_TYPE_BULK_FINALIZATION};
use maap_core::forms::AssignmentForm;
use maap_core::versioning::SemanticVersion;
use maap_db::models::check_in::{CheckIn, CheckInSideWrite};
use maap_db::models::maap_snapshot::CreateMaapSnapshot;
use maap_db::repositories::{
    AssignmentRepo, CheckInRepo, FinalizationCommitError, FinalizationRepo, MaapSnapshotRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn assignment(pool: &PgPool, organization_id: i64, title: &str) -> i64 {
    let form = AssignmentForm {
        title: title.to_string(),
        tagline: format!("{title} tagline"),
        ..AssignmentForm::default()
    };
    AssignmentRepo::create(pool, organization_id, &form, SemanticVersion::new(1, 0, 0))
        .await
        .unwrap()
        .id
}

/// Open an assignment check-in with both sides completed.
async fn ready_check_in(pool: &PgPool, teammate_id: i64, assignment_id: i64) -> i64 {
    let check_in = CheckInRepo::start(pool, CheckInKind::Assignment, teammate_id, assignment_id)
        .await
        .unwrap();
    let done = CheckInSideWrite {
        rating_text: Some("meeting".into()),
        completed_at: Some(Utc::now()),
        ..CheckInSideWrite::default()
    };
    assert!(CheckInRepo::write_employee_side(pool, CheckInKind::Assignment, check_in.id(), &done)
        .await
        .unwrap());
    assert!(CheckInRepo::write_manager_side(pool, CheckInKind::Assignment, check_in.id(), &done)
        .await
        .unwrap());
    check_in.id()
}

fn snapshot(employee: i64, manager: i64, company: i64) -> CreateMaapSnapshot {
    CreateMaapSnapshot {
        employee_teammate_id: employee,
        created_by_teammate_id: manager,
        company_id: company,
        change_type: CHANGE_TYPE_BULK_FINALIZATION.to_string(),
        reason: None,
        maap_data: json!({ "assignments": [] }),
        request_info: json!({ "ip_address": "127.0.0.1" }),
        effective_date: Utc::now().date_naive(),
    }
}

fn stamp(check_in_id: i64, subject_id: i64, rating: &str) -> OfficialStamp {
    OfficialStamp {
        kind: CheckInKind::Assignment,
        check_in_id,
        subject_id,
        official_rating: Some(rating.to_string()),
        shared_notes: format!("notes for {subject_id}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn commit_stamps_check_ins_and_links_snapshot(pool: PgPool) {
    let company = common::organization(&pool, "Acme", None).await;
    let manager = common::teammate(&pool, company, "m@acme.test").await;
    let employee = common::teammate(&pool, company, "e@acme.test").await;
    let a = assignment(&pool, company, "Onboarding").await;
    let check_in_id = ready_check_in(&pool, employee.id, a).await;

    let created = FinalizationRepo::commit(
        &pool,
        &snapshot(employee.id, manager.id, company),
        &[stamp(check_in_id, a, "exceeding")],
    )
    .await
    .unwrap();

    let Some(CheckIn::Assignment(row)) =
        CheckInRepo::find(&pool, CheckInKind::Assignment, check_in_id).await.unwrap()
    else {
        panic!("check-in should exist");
    };
    assert_eq!(row.official_rating.as_deref(), Some("exceeding"));
    assert_eq!(row.shared_notes.as_deref(), Some(format!("notes for {a}").as_str()));
    assert!(row.official_check_in_completed_at.is_some());
    assert_eq!(row.finalized_by_teammate_id, Some(manager.id));
    assert_eq!(row.maap_snapshot_id, Some(created.id));

    let open = CheckInRepo::list_open(&pool, employee.id).await.unwrap();
    assert!(open.assignment_check_ins.is_empty());

    let listed = MaapSnapshotRepo::list_for_teammate(&pool, employee.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].change_type, CHANGE_TYPE_BULK_FINALIZATION);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_stamp_rolls_back_everything(pool: PgPool) {
    let company = common::organization(&pool, "Acme", None).await;
    let manager = common::teammate(&pool, company, "m@acme.test").await;
    let employee = common::teammate(&pool, company, "e@acme.test").await;
    let a = assignment(&pool, company, "Onboarding").await;
    let b = assignment(&pool, company, "Hiring").await;
    let ready = ready_check_in(&pool, employee.id, a).await;
    // Employee side only: not ready.
    let half = CheckInRepo::start(&pool, CheckInKind::Assignment, employee.id, b)
        .await
        .unwrap()
        .id();

    let err = FinalizationRepo::commit(
        &pool,
        &snapshot(employee.id, manager.id, company),
        &[stamp(ready, a, "meeting"), stamp(half, b, "meeting")],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FinalizationCommitError::Stale { check_in_id, .. } if check_in_id == half));

    let open = CheckInRepo::list_open(&pool, employee.id).await.unwrap();
    assert_eq!(open.assignment_check_ins.len(), 2, "first stamp must be rolled back");
    assert!(MaapSnapshotRepo::list_for_teammate(&pool, employee.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_one_open_check_in_per_subject(pool: PgPool) {
    let company = common::organization(&pool, "Acme", None).await;
    let employee = common::teammate(&pool, company, "e@acme.test").await;
    let a = assignment(&pool, company, "Onboarding").await;

    CheckInRepo::start(&pool, CheckInKind::Assignment, employee.id, a).await.unwrap();
    let err = CheckInRepo::start(&pool, CheckInKind::Assignment, employee.id, a)
        .await
        .unwrap_err();
    assert!(maap_db::is_unique_violation(&err, "uq_assignment_check_ins_open"));
}
