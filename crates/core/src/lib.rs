//! Domain logic for the MAAP performance-management backend.
//!
//! This crate has no database or HTTP dependencies. Everything here operates
//! on plain values loaded by the caller, which keeps the business rules
//! (versioning, check-in finalization, observation visibility and feed
//! queries) unit-testable in isolation.

pub mod check_in;
pub mod error;
pub mod finalization;
pub mod forms;
pub mod observation;
pub mod observation_query;
pub mod policy;
pub mod types;
pub mod validation;
pub mod versioning;
pub mod visibility;
