//! Shared error types for the forecast editing system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid date-time group: {input}")]
    InvalidDtg { input: String },

    #[error("Invalid wind-radii threshold: {value}")]
    InvalidThreshold { value: u16 },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Serialization failed: {message}")]
    SerializationError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
