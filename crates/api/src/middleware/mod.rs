//! Request context extractors.
//!
//! - [`auth::AuthUser`]: the signed-in person, from a JWT Bearer token.
//! - [`auth::MaybeAuthUser`]: the same, optional, for public endpoints.
//! - [`acting::ActingTeammate`]: the person's membership in the addressed
//!   organization, plus the company's management hierarchy.

pub mod acting;
pub mod auth;
