//! Seed helpers shared by the repository integration tests.

#![allow(dead_code)]

use chrono::Utc;
use sqlx::PgPool;
use maap_db::models::organization::CreateOrganization;
use maap_db::models::person::CreatePerson;
use maap_db::models::teammate::{CreateTeammate, Teammate};
use maap_db::repositories::{OrganizationRepo, PersonRepo, TeammateRepo};

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

/// A person with an active teammate record in `organization_id`.
pub async fn teammate(pool: &PgPool, organization_id: i64, email: &str) -> Teammate {
    let person = PersonRepo::create(
        pool,
        &CreatePerson {
            email: email.to_string(),
            full_name: email.to_string(),
            password_hash: None,
        },
    )
    .await
    .unwrap();

    TeammateRepo::create(
        pool,
        &CreateTeammate {
            person_id: person.id,
            organization_id,
            first_employed_at: Some(Utc::now()),
            ..CreateTeammate::default()
        },
    )
    .await
    .unwrap()
}
