//! Repository for the three check-in tables.

use sqlx::PgPool;
use maap_core::check_in::CheckInKind;
use maap_core::types::DbId;

use crate::models::check_in::{
    AspirationCheckIn, AssignmentCheckIn, CheckIn, CheckInSideWrite, PositionCheckIn,
    TeammateCheckIns,
};

/// Columns shared by every check-in table, after the subject column.
const SHARED_COLUMNS: &str = "check_in_started_on, employee_rating, employee_private_notes, \
    employee_completed_at, manager_rating, manager_private_notes, manager_completed_at, \
    official_rating, shared_notes, official_check_in_completed_at, finalized_by_teammate_id, \
    maap_snapshot_id, created_at, updated_at";

fn assignment_columns() -> String {
    format!(
        "id, teammate_id, assignment_id, employee_personal_alignment, \
         actual_energy_percentage, {SHARED_COLUMNS}"
    )
}

fn position_columns() -> String {
    format!("id, teammate_id, position_id, {SHARED_COLUMNS}")
}

fn aspiration_columns() -> String {
    format!("id, teammate_id, aspiration_id, {SHARED_COLUMNS}")
}

/// Table holding check-ins of `kind`.
pub fn table_name(kind: CheckInKind) -> &'static str {
    match kind {
        CheckInKind::Assignment => "assignment_check_ins",
        CheckInKind::Position => "position_check_ins",
        CheckInKind::Aspiration => "aspiration_check_ins",
    }
}

/// Which check-in per subject a teammate listing returns.
#[derive(Debug, Clone, Copy)]
enum Listing {
    /// Only check-ins that have not been finalized.
    Open,
    /// The open check-in, falling back to the latest finalized one.
    Current,
}

impl Listing {
    /// One row per subject of a keyed table, ordered by subject.
    fn query(self, columns: &str, table: &str, subject: &str) -> String {
        match self {
            Listing::Open => format!(
                "SELECT {columns} FROM {table}
                 WHERE teammate_id = $1 AND official_check_in_completed_at IS NULL
                 ORDER BY {subject} ASC, id ASC"
            ),
            Listing::Current => format!(
                "SELECT DISTINCT ON ({subject}) {columns} FROM {table}
                 WHERE teammate_id = $1
                 ORDER BY {subject} ASC,
                          official_check_in_completed_at IS NULL DESC,
                          official_check_in_completed_at DESC,
                          id DESC"
            ),
        }
    }

    /// The single position check-in.
    fn single_query(self, columns: &str, table: &str) -> String {
        match self {
            Listing::Open => format!(
                "SELECT {columns} FROM {table}
                 WHERE teammate_id = $1 AND official_check_in_completed_at IS NULL
                 ORDER BY id DESC
                 LIMIT 1"
            ),
            Listing::Current => format!(
                "SELECT {columns} FROM {table}
                 WHERE teammate_id = $1
                 ORDER BY official_check_in_completed_at IS NULL DESC,
                          official_check_in_completed_at DESC,
                          id DESC
                 LIMIT 1"
            ),
        }
    }
}

/// Provides reads, starts, and side updates for check-ins.
pub struct CheckInRepo;

impl CheckInRepo {
    /* ---- Reads ---- */

    /// The teammate's open check-ins of every kind, ordered by subject.
    pub async fn list_open(
        pool: &PgPool,
        teammate_id: DbId,
    ) -> Result<TeammateCheckIns, sqlx::Error> {
        Self::list_per_subject(pool, teammate_id, Listing::Open).await
    }

    /// The teammate's current check-in on every subject they have one for:
    /// the open one when it exists, otherwise the most recently finalized.
    ///
    /// This is the teammate's full official state, which every snapshot
    /// records whether or not a subject takes part in the finalization.
    pub async fn list_current(
        pool: &PgPool,
        teammate_id: DbId,
    ) -> Result<TeammateCheckIns, sqlx::Error> {
        Self::list_per_subject(pool, teammate_id, Listing::Current).await
    }

    async fn list_per_subject(
        pool: &PgPool,
        teammate_id: DbId,
        listing: Listing,
    ) -> Result<TeammateCheckIns, sqlx::Error> {
        let assignments = listing.query(&assignment_columns(), "assignment_check_ins", "assignment_id");
        let position = listing.single_query(&position_columns(), "position_check_ins");
        let aspirations = listing.query(&aspiration_columns(), "aspiration_check_ins", "aspiration_id");

        Ok(TeammateCheckIns {
            assignment_check_ins: sqlx::query_as::<_, AssignmentCheckIn>(&assignments)
                .bind(teammate_id)
                .fetch_all(pool)
                .await?,
            position_check_in: sqlx::query_as::<_, PositionCheckIn>(&position)
                .bind(teammate_id)
                .fetch_optional(pool)
                .await?,
            aspiration_check_ins: sqlx::query_as::<_, AspirationCheckIn>(&aspirations)
                .bind(teammate_id)
                .fetch_all(pool)
                .await?,
        })
    }

    /// Find a check-in of `kind` by ID.
    pub async fn find(
        pool: &PgPool,
        kind: CheckInKind,
        id: DbId,
    ) -> Result<Option<CheckIn>, sqlx::Error> {
        let check_in = match kind {
            CheckInKind::Assignment => {
                let query = format!(
                    "SELECT {} FROM assignment_check_ins WHERE id = $1",
                    assignment_columns()
                );
                sqlx::query_as::<_, AssignmentCheckIn>(&query)
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
                    .map(CheckIn::Assignment)
            }
            CheckInKind::Position => {
                let query = format!(
                    "SELECT {} FROM position_check_ins WHERE id = $1",
                    position_columns()
                );
                sqlx::query_as::<_, PositionCheckIn>(&query)
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
                    .map(CheckIn::Position)
            }
            CheckInKind::Aspiration => {
                let query = format!(
                    "SELECT {} FROM aspiration_check_ins WHERE id = $1",
                    aspiration_columns()
                );
                sqlx::query_as::<_, AspirationCheckIn>(&query)
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
                    .map(CheckIn::Aspiration)
            }
        };
        Ok(check_in)
    }

    /* ---- Starts ---- */

    /// Open a check-in on `subject_id` for a teammate.
    ///
    /// Fails with a `uq_<table>_open` unique violation when one is already
    /// open for that subject.
    pub async fn start(
        pool: &PgPool,
        kind: CheckInKind,
        teammate_id: DbId,
        subject_id: DbId,
    ) -> Result<CheckIn, sqlx::Error> {
        let check_in = match kind {
            CheckInKind::Assignment => {
                let query = format!(
                    "INSERT INTO assignment_check_ins (teammate_id, assignment_id)
                     VALUES ($1, $2) RETURNING {}",
                    assignment_columns()
                );
                CheckIn::Assignment(
                    sqlx::query_as::<_, AssignmentCheckIn>(&query)
                        .bind(teammate_id)
                        .bind(subject_id)
                        .fetch_one(pool)
                        .await?,
                )
            }
            CheckInKind::Position => {
                let query = format!(
                    "INSERT INTO position_check_ins (teammate_id, position_id)
                     VALUES ($1, $2) RETURNING {}",
                    position_columns()
                );
                CheckIn::Position(
                    sqlx::query_as::<_, PositionCheckIn>(&query)
                        .bind(teammate_id)
                        .bind(subject_id)
                        .fetch_one(pool)
                        .await?,
                )
            }
            CheckInKind::Aspiration => {
                let query = format!(
                    "INSERT INTO aspiration_check_ins (teammate_id, aspiration_id)
                     VALUES ($1, $2) RETURNING {}",
                    aspiration_columns()
                );
                CheckIn::Aspiration(
                    sqlx::query_as::<_, AspirationCheckIn>(&query)
                        .bind(teammate_id)
                        .bind(subject_id)
                        .fetch_one(pool)
                        .await?,
                )
            }
        };
        Ok(check_in)
    }

    /* ---- Side updates ---- */

    /// Write the employee side of an open check-in.
    ///
    /// Ratings and notes left `None` keep their stored value; `completed_at`
    /// is written as given. Returns `false` when the check-in is closed or
    /// missing.
    pub async fn write_employee_side(
        pool: &PgPool,
        kind: CheckInKind,
        id: DbId,
        write: &CheckInSideWrite,
    ) -> Result<bool, sqlx::Error> {
        Self::write_side(pool, kind, "employee", id, write).await
    }

    /// Write the manager side of an open check-in. See
    /// [`write_employee_side`](Self::write_employee_side).
    pub async fn write_manager_side(
        pool: &PgPool,
        kind: CheckInKind,
        id: DbId,
        write: &CheckInSideWrite,
    ) -> Result<bool, sqlx::Error> {
        Self::write_side(pool, kind, "manager", id, write).await
    }

    async fn write_side(
        pool: &PgPool,
        kind: CheckInKind,
        side: &'static str,
        id: DbId,
        write: &CheckInSideWrite,
    ) -> Result<bool, sqlx::Error> {
        let table = table_name(kind);
        // Personal alignment and energy only exist on the employee side of
        // assignment check-ins.
        let extra = if kind == CheckInKind::Assignment && side == "employee" {
            ", employee_personal_alignment = COALESCE($5, employee_personal_alignment), \
             actual_energy_percentage = COALESCE($6, actual_energy_percentage)"
        } else {
            ""
        };
        let query = format!(
            "UPDATE {table} SET
                {side}_rating = COALESCE($2, {side}_rating),
                {side}_private_notes = COALESCE($3, {side}_private_notes),
                {side}_completed_at = $4{extra}
             WHERE id = $1 AND official_check_in_completed_at IS NULL"
        );

        let mut q = sqlx::query(&query).bind(id);
        q = match kind {
            CheckInKind::Position => q.bind(write.rating_number),
            _ => q.bind(write.rating_text.as_deref()),
        };
        q = q.bind(write.private_notes.as_deref()).bind(write.completed_at);
        if !extra.is_empty() {
            q = q
                .bind(write.personal_alignment.map(|a| a.as_str()))
                .bind(write.actual_energy_percentage);
        }

        let result = q.execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
