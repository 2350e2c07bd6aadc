//! Repository for the `people` table.

use sqlx::PgPool;
use maap_core::types::DbId;

use crate::models::person::{CreatePerson, Person};

/// Column list for people queries.
const COLUMNS: &str = "id, email, full_name, password_hash, created_at, updated_at";

/// Provides lookups and inserts for people.
pub struct PersonRepo;

impl PersonRepo {
    /// Insert a new person, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePerson) -> Result<Person, sqlx::Error> {
        let query = format!(
            "INSERT INTO people (email, full_name, password_hash)
             VALUES (LOWER($1), $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a person by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM people WHERE id = $1");
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a person by email, case-insensitively.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM people WHERE email = LOWER($1)");
        sqlx::query_as::<_, Person>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
