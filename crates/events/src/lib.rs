//! MAAP domain events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope, with constructors for the
//!   events the backend raises.
//! - [`EventPersistence`]: background task writing every event to the
//!   `events` table.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::{EventPersistence, PersistError, PersistenceStats};
