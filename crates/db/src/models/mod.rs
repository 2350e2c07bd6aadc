//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and, where the API writes the table, `Deserialize`
//! create/update DTOs.

pub mod ability;
pub mod assignment;
pub mod aspiration;
pub mod check_in;
pub mod employment_tenure;
pub mod event;
pub mod maap_snapshot;
pub mod milestone;
pub mod observation;
pub mod organization;
pub mod person;
pub mod position;
pub mod teammate;
