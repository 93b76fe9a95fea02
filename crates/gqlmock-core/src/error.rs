//! Engine-wide error types
//!
//! Only configuration problems are errors in this crate. An operation that
//! no mock satisfies, or a mock that deliberately simulates a network
//! failure, is reported as an [`Outcome`](crate::engine::Outcome) value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine-wide error type
///
/// Raised synchronously while a registry is being built or a rendering
/// context is starting. Any of these aborts context setup entirely.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MockError {
    /// A mock definition failed validation
    #[error("Invalid mock #{index}: {reason}")]
    InvalidMock { index: usize, reason: String },

    /// Engine settings failed validation
    #[error("Invalid engine settings: {0}")]
    InvalidSettings(String),

    /// Query source could not be turned into an operation descriptor
    #[error("Invalid operation document: {0}")]
    InvalidDocument(String),

    /// Context was used after teardown
    #[error("Rendering context {0} has been torn down")]
    ContextTornDown(String),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    IoError(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MockError {
    pub(crate) fn invalid_mock(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidMock {
            index,
            reason: reason.into(),
        }
    }

    /// Whether this error came from validating mock definitions or settings
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MockError::InvalidMock { .. }
                | MockError::InvalidSettings(_)
                | MockError::InvalidDocument(_)
        )
    }
}

impl From<MockError> for String {
    fn from(error: MockError) -> String {
        error.to_string()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MockError>;

impl From<std::io::Error> for MockError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for MockError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mock_display() {
        let err = MockError::invalid_mock(2, "max_uses must be positive");
        assert_eq!(err.to_string(), "Invalid mock #2: max_uses must be positive");
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_io_error_is_not_configuration_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "mocks.json");
        let err: MockError = io.into();
        assert!(matches!(err, MockError::IoError(_)));
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_error_serde_shape() {
        let err = MockError::InvalidSettings("default_delay_ms must not be negative".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "InvalidSettings");
        assert_eq!(json["message"], "default_delay_ms must not be negative");
    }
}
