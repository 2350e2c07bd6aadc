//! Check-in flows, finalization and MAAP snapshots over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth};
use maap_core::forms::AssignmentForm;
use maap_core::versioning::SemanticVersion;
use maap_db::models::teammate::Teammate;
use maap_db::repositories::AssignmentRepo;
use sqlx::PgPool;

struct Team {
    company: i64,
    manager: Teammate,
    dev: Teammate,
    peer: Teammate,
    assignment_id: i64,
}

async fn team(pool: &PgPool) -> Team {
    let company = common::organization(pool, "Acme", None).await;
    let manager = common::teammate(pool, company, "lead@acme.test").await;
    let dev = common::teammate(pool, company, "dev@acme.test").await;
    let peer = common::teammate(pool, company, "peer@acme.test").await;
    common::manages(pool, &manager, &dev).await;
    let assignment_id = assignment(pool, company, "On-call").await;

    Team {
        company,
        manager,
        dev,
        peer,
        assignment_id,
    }
}

async fn assignment(pool: &PgPool, company: i64, title: &str) -> i64 {
    AssignmentRepo::create(
        pool,
        company,
        &AssignmentForm {
            title: title.into(),
            tagline: "Keep the lights on".into(),
            ..AssignmentForm::default()
        },
        SemanticVersion::new(1, 0, 0),
    )
    .await
    .unwrap()
    .id
}

impl Team {
    fn check_ins(&self) -> String {
        format!(
            "/api/v1/organizations/{}/teammates/{}/check-ins",
            self.company, self.dev.id
        )
    }

    fn finalization(&self) -> String {
        format!(
            "/api/v1/organizations/{}/teammates/{}/finalization",
            self.company, self.dev.id
        )
    }
}

/// Start a check-in on the team's assignment and return its id.
async fn start(app: axum::Router, team: &Team) -> i64 {
    start_on(app, team, team.assignment_id).await
}

/// Start an assignment check-in as the teammate and return its id.
async fn start_on(app: axum::Router, team: &Team, assignment_id: i64) -> i64 {
    let response = post_json_auth(
        app,
        &format!("{}/assignment", team.check_ins()),
        serde_json::json!({ "subject_id": assignment_id }),
        &common::token(team.dev.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn complete_employee_side(app: axum::Router, team: &Team, check_in_id: i64) {
    let response = put_json_auth(
        app,
        &format!("{}/assignment/{check_in_id}/employee", team.check_ins()),
        serde_json::json!({
            "employee_rating": "meeting",
            "employee_personal_alignment": "love",
            "actual_energy_percentage": 60,
            "employee_completed": true
        }),
        &common::token(team.dev.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn complete_manager_side(app: axum::Router, team: &Team, check_in_id: i64) {
    let response = put_json_auth(
        app,
        &format!("{}/assignment/{check_in_id}/manager", team.check_ins()),
        serde_json::json!({ "manager_rating": "exceeding", "manager_completed": true }),
        &common::token(team.manager.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_open_check_in_on_a_subject_conflicts(pool: PgPool) {
    let team = team(&pool).await;
    let app = common::build_test_app(pool);
    start(app.clone(), &team).await;

    let response = post_json_auth(
        app,
        &format!("{}/assignments", team.check_ins()),
        serde_json::json!({ "subject_id": team.assignment_id }),
        &common::token(team.manager.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sides_are_written_by_the_right_people(pool: PgPool) {
    let team = team(&pool).await;
    let app = common::build_test_app(pool);
    let id = start(app.clone(), &team).await;

    // The teammate cannot write the manager side, the manager cannot write
    // the employee side.
    let response = put_json_auth(
        app.clone(),
        &format!("{}/assignment/{id}/manager", team.check_ins()),
        serde_json::json!({ "manager_rating": "exceeding" }),
        &common::token(team.dev.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        app.clone(),
        &format!("{}/assignment/{id}/employee", team.check_ins()),
        serde_json::json!({ "employee_rating": "meeting" }),
        &common::token(team.manager.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    complete_employee_side(app.clone(), &team, id).await;

    let response = get_auth(app, &team.check_ins(), &common::token(team.dev.person_id)).await;
    let json = body_json(response).await;
    let check_in = &json["data"]["assignment_check_ins"][0];
    assert_eq!(check_in["employee_rating"], "meeting");
    assert_eq!(check_in["employee_personal_alignment"], "love");
    assert!(check_in["employee_completed_at"].is_string());
    assert!(check_in["manager_completed_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_personal_alignment_is_rejected_loudly(pool: PgPool) {
    let team = team(&pool).await;
    let app = common::build_test_app(pool);
    let id = start(app.clone(), &team).await;

    let response = put_json_auth(
        app,
        &format!("{}/assignment/{id}/employee", team.check_ins()),
        serde_json::json!({ "employee_personal_alignment": "adore" }),
        &common::token(team.dev.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_scale_rating_is_a_field_error(pool: PgPool) {
    let team = team(&pool).await;
    let app = common::build_test_app(pool);
    let id = start(app.clone(), &team).await;

    let response = put_json_auth(
        app,
        &format!("{}/assignment/{id}/employee", team.check_ins()),
        serde_json::json!({ "employee_rating": 2, "actual_energy_percentage": 140 }),
        &common::token(team.dev.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["errors"]["employee_rating"].is_array());
    assert!(json["errors"]["actual_energy_percentage"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_finalizes_completed_check_in(pool: PgPool) {
    let team = team(&pool).await;
    let app = common::build_test_app(pool);
    let id = start(app.clone(), &team).await;
    complete_employee_side(app.clone(), &team, id).await;
    complete_manager_side(app.clone(), &team, id).await;

    let body = serde_json::json!({
        "assignment_check_ins": {
            team.assignment_id.to_string(): {
                "finalize": "1",
                "official_rating": "exceeding",
                "shared_notes": "Great quarter"
            }
        },
        "reason": "Q3 review"
    });
    let response = post_json_auth(
        app.clone(),
        &team.finalization(),
        body,
        &common::token(team.manager.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let snapshot_id = json["data"]["snapshot"]["id"].as_i64().unwrap();
    assert_eq!(
        json["data"]["redirect_to"],
        format!("/api/v1/organizations/{}/maap-snapshots/{snapshot_id}", team.company)
    );
    assert_eq!(json["data"]["summary"]["assignment_check_in_ids"][0], id);
    let entry = &json["data"]["snapshot"]["maap_data"]["assignments"][0];
    assert_eq!(entry["official_check_in"]["official_rating"], "exceeding");
    assert_eq!(entry["official_check_in"]["shared_notes"], "Great quarter");

    // Closed check-ins leave the open list.
    let response = get_auth(app.clone(), &team.check_ins(), &common::token(team.dev.person_id)).await;
    let open = body_json(response).await;
    assert!(open["data"]["assignment_check_ins"].as_array().unwrap().is_empty());

    // The teammate sees the snapshot, a peer does not.
    let snapshot_path = format!(
        "/api/v1/organizations/{}/maap-snapshots/{snapshot_id}",
        team.company
    );
    let response = get_auth(app.clone(), &snapshot_path, &common::token(team.dev.person_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(app, &snapshot_path, &common::token(team.peer.person_id)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn incomplete_check_in_cannot_be_finalized(pool: PgPool) {
    let team = team(&pool).await;
    let app = common::build_test_app(pool);
    let id = start(app.clone(), &team).await;
    complete_employee_side(app.clone(), &team, id).await;

    let body = serde_json::json!({
        "[assignment_check_ins]": {
            team.assignment_id.to_string(): { "finalize": true, "official_rating": "meeting" }
        }
    });
    let response = post_json_auth(
        app.clone(),
        &team.finalization(),
        body,
        &common::token(team.manager.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "FINALIZATION_FAILED");
    assert_eq!(json["redirect_to"], team.check_ins());

    // Nothing was persisted.
    let response = get_auth(
        app,
        &format!(
            "/api/v1/organizations/{}/teammates/{}/maap-snapshots",
            team.company, team.dev.id
        ),
        &common::token(team.manager.person_id),
    )
    .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_selection_and_self_finalization_are_refused(pool: PgPool) {
    let team = team(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        &team.finalization(),
        serde_json::json!({}),
        &common::token(team.manager.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"],
        "No check-ins were selected for finalization"
    );

    let response = post_json_auth(
        app,
        &team.finalization(),
        serde_json::json!({}),
        &common::token(team.dev.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Start and complete both sides of a check-in on `assignment_id`.
async fn ready_check_in(app: axum::Router, team: &Team, assignment_id: i64) -> i64 {
    let id = start_on(app.clone(), team, assignment_id).await;
    complete_employee_side(app.clone(), team, id).await;
    complete_manager_side(app, team, id).await;
    id
}

/// `maap_data.assignments` entries keyed by assignment id.
fn assignments_by_id(maap_data: &serde_json::Value) -> Vec<(i64, serde_json::Value)> {
    maap_data["assignments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| (a["assignment_id"].as_i64().unwrap(), a.clone()))
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn finalizing_two_of_three_keeps_each_subjects_notes(pool: PgPool) {
    let team = team(&pool).await;
    let second = assignment(&pool, team.company, "Code review").await;
    let third = assignment(&pool, team.company, "Mentoring").await;
    let app = common::build_test_app(pool);

    let first_id = ready_check_in(app.clone(), &team, team.assignment_id).await;
    let second_id = ready_check_in(app.clone(), &team, second).await;
    let third_id = ready_check_in(app.clone(), &team, third).await;

    let body = serde_json::json!({
        "assignment_check_ins": {
            team.assignment_id.to_string(): {
                "finalize": "1", "official_rating": "meeting", "shared_notes": "A"
            },
            second.to_string(): {
                "finalize": "1", "official_rating": "exceeding", "shared_notes": "B"
            }
        }
    });
    let response = post_json_auth(
        app.clone(),
        &team.finalization(),
        body,
        &common::token(team.manager.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let snapshot_id = body_json(response).await["data"]["snapshot"]["id"].as_i64().unwrap();

    // Read the snapshot back as persisted.
    let response = get_auth(
        app.clone(),
        &format!("/api/v1/organizations/{}/maap-snapshots/{snapshot_id}", team.company),
        &common::token(team.manager.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = body_json(response).await;
    let entries = assignments_by_id(&stored["data"]["maap_data"]);

    let notes: Vec<(i64, &str)> = entries
        .iter()
        .map(|(id, e)| (*id, e["official_check_in"]["shared_notes"].as_str().unwrap()))
        .collect();
    assert_eq!(
        notes,
        vec![(team.assignment_id, "A"), (second, "B"), (third, "")]
    );
    assert_eq!(entries[0].1["check_in_id"], first_id);
    assert_eq!(entries[1].1["check_in_id"], second_id);
    assert_eq!(entries[2].1["finalized"], false);

    // The omitted check-in is still open.
    let response = get_auth(app, &team.check_ins(), &common::token(team.dev.person_id)).await;
    let open = body_json(response).await;
    let open_ids: Vec<i64> = open["data"]["assignment_check_ins"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(open_ids, vec![third_id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn later_finalization_keeps_earlier_official_state(pool: PgPool) {
    let team = team(&pool).await;
    let later = assignment(&pool, team.company, "Code review").await;
    let app = common::build_test_app(pool);
    let manager = common::token(team.manager.person_id);

    let first_id = ready_check_in(app.clone(), &team, team.assignment_id).await;
    let response = post_json_auth(
        app.clone(),
        &team.finalization(),
        serde_json::json!({
            "assignment_check_ins": {
                team.assignment_id.to_string(): {
                    "finalize": "1", "official_rating": "meeting", "shared_notes": "A-notes"
                }
            }
        }),
        &manager,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    ready_check_in(app.clone(), &team, later).await;
    let response = post_json_auth(
        app.clone(),
        &team.finalization(),
        serde_json::json!({
            "assignment_check_ins": {
                later.to_string(): {
                    "finalize": "1", "official_rating": "exceeding", "shared_notes": "B-notes"
                }
            }
        }),
        &manager,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let entries = assignments_by_id(&json["data"]["snapshot"]["maap_data"]);
    assert_eq!(entries.len(), 2);

    let (earlier_id, earlier) = &entries[0];
    assert_eq!(*earlier_id, team.assignment_id);
    assert_eq!(earlier["check_in_id"], first_id);
    assert_eq!(earlier["finalized"], false);
    assert_eq!(earlier["official_check_in"]["shared_notes"], "A-notes");
    assert_eq!(earlier["official_check_in"]["official_rating"], "meeting");

    let (later_id, latest) = &entries[1];
    assert_eq!(*later_id, later);
    assert_eq!(latest["official_check_in"]["shared_notes"], "B-notes");
    assert_eq!(json["data"]["summary"]["assignment_check_in_ids"].as_array().unwrap().len(), 1);

    // A closed check-in can't be finalized a second time.
    let response = post_json_auth(
        app,
        &team.finalization(),
        serde_json::json!({
            "assignment_check_ins": {
                team.assignment_id.to_string(): { "finalize": "1", "shared_notes": "again" }
            }
        }),
        &manager,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "FINALIZATION_FAILED");
}
