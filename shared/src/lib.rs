//! Shared types for the forecast editing tools
//!
//! Record identity, record payloads, site preferences and logging helpers
//! used by every crate in the workspace.

pub mod config;
pub mod errors;
pub mod logging;
pub mod record;
pub mod types;

pub use config::{GustTable, SiteLimits, round_to_five};
pub use errors::*;
pub use record::*;
pub use types::*;
