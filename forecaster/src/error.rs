//! Forecaster-specific error types

use shared::{SharedError, WindThreshold};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Malformed input for {field}: {input:?}")]
    MalformedInput { field: String, input: String },

    #[error("Persistence operation failed: {operation}: {message}")]
    Persistence { operation: String, message: String },

    #[error("Incomplete forecast at TAU {lead_hours}: {message}")]
    IncompleteForecast {
        lead_hours: i32,
        thresholds: Vec<WindThreshold>,
        message: String,
    },

    #[error("No {threshold} record at TAU {lead_hours}")]
    MissingRecord {
        lead_hours: i32,
        threshold: WindThreshold,
    },

    #[error("Configuration error: {field}: {message}")]
    Configuration { field: String, message: String },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn persistence(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn missing(lead_hours: i32, threshold: WindThreshold) -> Self {
        Self::MissingRecord { lead_hours, threshold }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type ForecastResult<T> = Result<T, ForecastError>;
