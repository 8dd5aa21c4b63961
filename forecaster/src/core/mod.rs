//! Core business logic modules
//!
//! Pure record logic with no I/O: the record store, editability policy,
//! edit operations, invariant audit and session seeding.

pub mod audit;
pub mod consistency;
pub mod policy;
pub mod seed;
pub mod store;

pub use audit::{audit, Violation};
pub use consistency::{ConsistencyEngine, IntensityFields, PendingChanges};
pub use policy::{CompletenessReport, WindRadiiPolicy};
pub use seed::{seed_forecast, SeedSource, SeededForecast};
pub use store::{ChangeEvent, RecordStore, StoreSnapshot};
