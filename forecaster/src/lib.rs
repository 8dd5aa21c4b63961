//! Forecast record consistency and edit-session engine
//!
//! Forecasters edit track, intensity, wind radii and seas for future lead
//! times. This library keeps the per-threshold records consistent while they
//! are edited, isolates edits in a session until committed, and mirrors the
//! committed forecast into the official aid's records.

pub mod core;
pub mod error;
pub mod forecaster;
pub mod reconciler;
pub mod services;
pub mod session;
pub mod traits;

// Re-export commonly used types
pub use crate::core::{
    audit, seed_forecast, ChangeEvent, ConsistencyEngine, PendingChanges, RecordStore, SeedSource, StoreSnapshot,
    Violation, WindRadiiPolicy,
};
pub use error::{ForecastError, ForecastResult};
pub use crate::forecaster::{Forecaster, SaveOutcome};
pub use reconciler::ExternalAidReconciler;
pub use session::EditSession;
pub use traits::{AidStore, SiteConfigSource, StagingStore};
