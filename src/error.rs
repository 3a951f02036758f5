//! Error types for the procal-knn toolkit

use thiserror::Error;

/// Result type alias for procal-knn operations
pub type Result<T> = std::result::Result<T, ProcalError>;

/// Main error type for the toolkit
#[derive(Error, Debug)]
pub enum ProcalError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ProcalError {
    /// Build an `InvalidParameter` error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ProcalError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error is the reportable `InvalidParameter` kind
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, ProcalError::InvalidParameter { .. })
    }
}

impl From<polars::error::PolarsError> for ProcalError {
    fn from(err: polars::error::PolarsError) -> Self {
        ProcalError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ProcalError {
    fn from(err: serde_json::Error) -> Self {
        ProcalError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ProcalError {
    fn from(err: ndarray::ShapeError) -> Self {
        ProcalError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
