//! Error types for rotor
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in rotor
#[derive(Debug, Error)]
pub enum RotorError {
    /// No authenticated identity was supplied
    #[error("Unauthorized")]
    Unauthorized,

    /// The identity lacks the role required for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Caller-supplied value is out of range or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<rusqlite::Error> for RotorError {
    fn from(err: rusqlite::Error) -> Self {
        RotorError::Storage(err.to_string())
    }
}

/// Result type alias for rotor operations
pub type Result<T> = std::result::Result<T, RotorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_error() {
        assert_eq!(RotorError::Unauthorized.to_string(), "Unauthorized");
    }

    #[test]
    fn test_forbidden_error() {
        let err = RotorError::Forbidden("admin role required".to_string());
        assert_eq!(err.to_string(), "Forbidden: admin role required");
    }

    #[test]
    fn test_invalid_input_error() {
        let err = RotorError::InvalidInput("source id must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: source id must be positive");
    }

    #[test]
    fn test_storage_error() {
        let err = RotorError::Storage("database is locked".to_string());
        assert_eq!(err.to_string(), "Storage error: database is locked");
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: RotorError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RotorError::Storage(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RotorError = io_err.into();
        assert!(matches!(err, RotorError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("{not: a list").unwrap_err();
        let err: RotorError = yaml_err.into();
        assert!(matches!(err, RotorError::Yaml(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(RotorError::Unauthorized)
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
