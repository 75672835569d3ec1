//! Error types for the sigboost training pipeline

use thiserror::Error;

/// Result type alias for sigboost operations
pub type Result<T> = std::result::Result<T, SigboostError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum SigboostError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl From<polars::error::PolarsError> for SigboostError {
    fn from(err: polars::error::PolarsError) -> Self {
        SigboostError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for SigboostError {
    fn from(err: serde_json::Error) -> Self {
        SigboostError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for SigboostError {
    fn from(err: bincode::Error) -> Self {
        SigboostError::SerializationError(err.to_string())
    }
}

impl From<ndarray_npy::WriteNpyError> for SigboostError {
    fn from(err: ndarray_npy::WriteNpyError) -> Self {
        SigboostError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SigboostError {
    fn from(err: ndarray::ShapeError) -> Self {
        SigboostError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SigboostError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SigboostError = io_err.into();
        assert!(matches!(err, SigboostError::IoError(_)));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = SigboostError::InvalidParameter {
            name: "eta".to_string(),
            value: "-1".to_string(),
            reason: "must be positive".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid parameter: eta = -1, must be positive");
    }
}
