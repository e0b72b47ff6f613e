//! Error types for the screening pipeline

use thiserror::Error;

/// Result type alias for screening operations
pub type Result<T> = std::result::Result<T, ScreenError>;

/// Main error type for the screening pipeline
#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature count mismatch: classifier expects {expected} columns, upload has {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Unknown label: classifier produced {0}, expected 0 or 1")]
    UnknownLabel(f64),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("Report error: character '{character}' in \"{text}\" is not supported by the report font")]
    UnsupportedText { character: char, text: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },
}

impl ScreenError {
    /// Whether the error was caused by what the user submitted, as opposed
    /// to the server or the loaded artifact.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ScreenError::DataError(_)
                | ScreenError::FeatureMismatch { .. }
                | ScreenError::ValidationError(_)
                | ScreenError::ShapeError { .. }
                | ScreenError::UnsupportedText { .. }
        )
    }
}

impl From<polars::error::PolarsError> for ScreenError {
    fn from(err: polars::error::PolarsError) -> Self {
        ScreenError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ScreenError {
    fn from(err: serde_json::Error) -> Self {
        ScreenError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ScreenError {
    fn from(err: ndarray::ShapeError) -> Self {
        ScreenError::ShapeError {
            expected: "rectangular feature matrix".to_string(),
            actual: err.to_string(),
        }
    }
}
