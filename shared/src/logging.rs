//! Shared logging utilities for consistent tracing across the forecast tools

use crate::types::StormId;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Initialize the stdout tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise the given level applies to the
/// workspace crates.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let base_level = log_level.unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("forecaster={base_level},shared={base_level}")));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for storm-aware info logging
#[macro_export]
macro_rules! storm_info {
    ($storm:expr, $($arg:tt)*) => {
        tracing::info!(
            storm = %$storm,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for storm-aware warning logging
#[macro_export]
macro_rules! storm_warn {
    ($storm:expr, $($arg:tt)*) => {
        tracing::warn!(
            storm = %$storm,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for storm-aware error logging
#[macro_export]
macro_rules! storm_error {
    ($storm:expr, $($arg:tt)*) => {
        tracing::error!(
            storm = %$storm,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for storm-aware debug logging
#[macro_export]
macro_rules! storm_debug {
    ($storm:expr, $($arg:tt)*) => {
        tracing::debug!(
            storm = %$storm,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(storm: &StormId, details: &str) {
    info!(
        storm = %storm,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(storm: &StormId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        storm = %storm,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(storm: &StormId, message: &str) {
    info!(
        storm = %storm,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let stamp = format_timestamp();
        // HH:MM:SS.mmm
        assert_eq!(stamp.len(), 12);
        assert_eq!(&stamp[2..3], ":");
        assert_eq!(&stamp[8..9], ".");
    }
}
