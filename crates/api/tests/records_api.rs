//! Ability, assignment and position management with semantic versioning.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth, Grants};
use sqlx::PgPool;

async fn maap_admin(pool: &PgPool) -> (i64, String) {
    let company = common::organization(pool, "Acme", None).await;
    let admin = common::teammate_with(
        pool,
        company,
        "admin@acme.test",
        Grants {
            manage_maap: true,
            ..Grants::default()
        },
    )
    .await;
    (company, common::token(admin.person_id))
}

fn ability(version_type: &str) -> serde_json::Value {
    serde_json::json!({
        "ability": {
            "name": "Rust",
            "description": "Writes idiomatic Rust",
            "version_type": version_type,
            "milestone_1_description": "Reads Rust code"
        }
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ability_versions_follow_version_type(pool: PgPool) {
    let (company, token) = maap_admin(&pool).await;
    let app = common::build_test_app(pool);
    let base = format!("/api/v1/organizations/{company}/abilities");

    let response = post_json_auth(app.clone(), &base, ability("nearly_ready"), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["semantic_version"], "0.1.0");
    let id = created["data"]["id"].as_i64().unwrap();

    let response =
        put_json_auth(app.clone(), &format!("{base}/{id}"), ability("fundamental"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["semantic_version"], "1.0.0");

    let response =
        put_json_auth(app.clone(), &format!("{base}/{id}"), ability("insignificant"), &token).await;
    assert_eq!(body_json(response).await["data"]["semantic_version"], "1.0.1");

    let response = get_auth(app, &base, &token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_version_type_is_rejected_on_create(pool: PgPool) {
    let (company, token) = maap_admin(&pool).await;
    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/organizations/{company}/assignments"),
        serde_json::json!({
            "assignment": { "title": "", "tagline": "Ship it", "version_type": "clarifying" }
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["errors"]["title"][0], "can't be blank");
    assert_eq!(json["errors"]["version_type"][0], "can't be blank");
    assert!(json["errors"].get("base").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_form_is_a_single_base_error(pool: PgPool) {
    let (company, token) = maap_admin(&pool).await;
    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/organizations/{company}/positions"),
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(
        json["errors"]["base"][0],
        "Form data is missing. Please fill out the form and try again."
    );
    assert_eq!(json["errors"].as_object().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn managing_records_requires_the_flag(pool: PgPool) {
    let company = common::organization(&pool, "Acme", None).await;
    let member = common::teammate(&pool, company, "dev@acme.test").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/organizations/{company}/abilities"),
        ability("ready"),
        &common::token(member.person_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn records_of_other_organizations_are_404(pool: PgPool) {
    let (company, token) = maap_admin(&pool).await;
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/organizations/{company}/positions/9999"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_edits_never_lose_a_bump(pool: PgPool) {
    let (company, token) = maap_admin(&pool).await;
    let app = common::build_test_app(pool);
    let base = format!("/api/v1/organizations/{company}/abilities");

    let response = post_json_auth(app.clone(), &base, ability("ready"), &token).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let path = format!("{base}/{id}");

    let mut edits = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let (app, path, token) = (app.clone(), path.clone(), token.clone());
        edits.spawn(async move {
            put_json_auth(app, &path, ability("clarifying"), &token)
                .await
                .status()
        });
    }

    let mut applied = 0;
    while let Some(status) = edits.join_next().await {
        match status.unwrap() {
            StatusCode::OK => applied += 1,
            StatusCode::CONFLICT => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert!(applied >= 1);

    // Every accepted edit is reflected in exactly one minor bump.
    let response = get_auth(app, &path, &token).await;
    assert_eq!(
        body_json(response).await["data"]["semantic_version"],
        format!("1.{applied}.0")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unreadable_stored_version_is_never_reset(pool: PgPool) {
    let (company, token) = maap_admin(&pool).await;
    let app = common::build_test_app(pool.clone());
    let base = format!("/api/v1/organizations/{company}/positions");

    let response = post_json_auth(
        app.clone(),
        &base,
        serde_json::json!({
            "position": { "title": "Engineer", "description": "Builds", "version_type": "ready" }
        }),
        &token,
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Digits only, so the column check accepts it, but too large for a component.
    sqlx::query("UPDATE positions SET semantic_version = '4294967296.0.0' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let response = put_json_auth(
        app,
        &format!("{base}/{id}"),
        serde_json::json!({
            "position": { "title": "Engineer", "description": "Builds well", "version_type": "insignificant" }
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let stored: String = sqlx::query_scalar("SELECT semantic_version FROM positions WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "4294967296.0.0");
}
