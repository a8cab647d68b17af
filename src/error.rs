//! Error types for the velocount pipelines

use thiserror::Error;

/// Result type alias for velocount operations
pub type Result<T> = std::result::Result<T, VelocountError>;

/// Main error type for the velocount crate
#[derive(Error, Debug)]
pub enum VelocountError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for VelocountError {
    fn from(err: polars::error::PolarsError) -> Self {
        VelocountError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for VelocountError {
    fn from(err: serde_json::Error) -> Self {
        VelocountError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for VelocountError {
    fn from(err: ndarray::ShapeError) -> Self {
        VelocountError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
