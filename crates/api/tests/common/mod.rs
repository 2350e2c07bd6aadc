//! Test harness shared by the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use maap_api::auth::jwt::{generate_access_token, JwtConfig};
use maap_api::auth::password::hash_password;
use maap_api::config::ServerConfig;
use maap_api::router::build_app_router;
use maap_api::state::AppState;
use maap_db::models::employment_tenure::CreateEmploymentTenure;
use maap_db::models::organization::CreateOrganization;
use maap_db::models::person::CreatePerson;
use maap_db::models::teammate::{CreateTeammate, Teammate};
use maap_db::repositories::{EmploymentTenureRepo, OrganizationRepo, PersonRepo, TeammateRepo};

pub const PASSWORD: &str = "correct horse battery staple";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        event_bus_capacity: 64,
        jwt: JwtConfig {
            secret: "test-secret-used-only-by-integration-tests".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// The production router over `pool`, with a fresh event bus.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_bus(pool, Arc::new(maap_events::EventBus::new(64)))
}

/// The production router publishing onto `event_bus`.
pub fn build_test_app_with_bus(pool: PgPool, event_bus: Arc<maap_events::EventBus>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
    };
    build_app_router(state, &config)
}

/// A bearer token for `person_id`, signed with the test secret.
pub fn token(person_id: i64) -> String {
    generate_access_token(person_id, &test_config().jwt).expect("token generation")
}

/* --------------------------------------------------------------------------
Requests
-------------------------------------------------------------------------- */

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/* --------------------------------------------------------------------------
Seed data
-------------------------------------------------------------------------- */

pub async fn organization(pool: &PgPool, name: &str, parent_id: Option<i64>) -> i64 {
    OrganizationRepo::create(
        pool,
        &CreateOrganization {
            name: name.to_string(),
            parent_id,
        },
    )
    .await
    .unwrap()
    .id
}

/// Flags granted to a seeded teammate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grants {
    pub manage_maap: bool,
    pub manage_employment: bool,
}

/// A person (password [`PASSWORD`]) with an active teammate record.
pub async fn teammate_with(
    pool: &PgPool,
    organization_id: i64,
    email: &str,
    grants: Grants,
) -> Teammate {
    let person = PersonRepo::create(
        pool,
        &CreatePerson {
            email: email.to_string(),
            full_name: email.to_string(),
            password_hash: Some(hash_password(PASSWORD).unwrap()),
        },
    )
    .await
    .unwrap();

    TeammateRepo::create(
        pool,
        &CreateTeammate {
            person_id: person.id,
            organization_id,
            can_manage_maap: grants.manage_maap,
            can_manage_employment: grants.manage_employment,
            first_employed_at: Some(Utc::now()),
            ..CreateTeammate::default()
        },
    )
    .await
    .unwrap()
}

pub async fn teammate(pool: &PgPool, organization_id: i64, email: &str) -> Teammate {
    teammate_with(pool, organization_id, email, Grants::default()).await
}

/// Record `manager` as the direct manager of `teammate`.
pub async fn manages(pool: &PgPool, manager: &Teammate, teammate: &Teammate) {
    EmploymentTenureRepo::start(
        pool,
        &CreateEmploymentTenure {
            teammate_id: teammate.id,
            position_id: None,
            manager_teammate_id: Some(manager.id),
            started_at: None,
        },
    )
    .await
    .unwrap();
}
