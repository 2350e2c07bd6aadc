//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod ability_repo;
pub mod aspiration_repo;
pub mod assignment_repo;
pub mod check_in_repo;
pub mod employment_tenure_repo;
pub mod event_repo;
pub mod finalization_repo;
pub mod maap_snapshot_repo;
pub mod milestone_repo;
pub mod observation_repo;
pub mod organization_repo;
pub mod person_repo;
pub mod position_repo;
pub mod teammate_repo;

pub use ability_repo::AbilityRepo;
pub use aspiration_repo::AspirationRepo;
pub use assignment_repo::AssignmentRepo;
pub use check_in_repo::CheckInRepo;
pub use employment_tenure_repo::EmploymentTenureRepo;
pub use event_repo::EventRepo;
pub use finalization_repo::{FinalizationCommitError, FinalizationRepo};
pub use maap_snapshot_repo::MaapSnapshotRepo;
pub use milestone_repo::MilestoneRepo;
pub use observation_repo::ObservationRepo;
pub use organization_repo::OrganizationRepo;
pub use person_repo::PersonRepo;
pub use position_repo::PositionRepo;
pub use teammate_repo::TeammateRepo;
