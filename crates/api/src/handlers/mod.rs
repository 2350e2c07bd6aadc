pub mod abilities;
pub mod assignments;
pub mod auth;
pub mod check_ins;
pub mod finalization;
pub mod kudos;
pub mod maap_snapshots;
pub mod observations;
pub mod positions;

use maap_core::error::CoreError;
use maap_core::types::DbId;

use crate::error::AppError;

/// A versioned record changed between being read and being saved.
pub(crate) fn edited_concurrently(entity: &str, id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "{entity} {id} was edited by someone else. Reload it and try again."
    )))
}
