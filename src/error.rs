// src/error.rs
// Standardized error types for langsync

use thiserror::Error;

/// Main error type for the langsync library
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no translation provider available for '{0}'")]
    NoProviderAvailable(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown error: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Fatal errors abort the whole pass; everything else is recorded
    /// per pair and the run continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Precondition(_))
    }
}

impl From<String> for SyncError {
    fn from(s: String) -> Self {
        SyncError::Other(s)
    }
}

impl From<SyncError> for String {
    fn from(err: SyncError) -> Self {
        err.to_string()
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(err: tokio::task::JoinError) -> Self {
        SyncError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // SyncError construction tests
    // ============================================================================

    #[test]
    fn test_invalid_input_error() {
        let err = SyncError::InvalidInput("bad data".to_string());
        assert!(err.to_string().contains("invalid input"));
        assert!(err.to_string().contains("bad data"));
    }

    #[test]
    fn test_no_provider_error() {
        let err = SyncError::NoProviderAvailable("fr".to_string());
        assert!(err.to_string().contains("no translation provider"));
        assert!(err.to_string().contains("fr"));
    }

    #[test]
    fn test_precondition_error_is_fatal() {
        let err = SyncError::Precondition("translation groups unavailable".to_string());
        assert!(err.is_fatal());
        assert!(err.to_string().contains("precondition failed"));
    }

    #[test]
    fn test_non_precondition_errors_are_not_fatal() {
        assert!(!SyncError::NoProviderAvailable("en".to_string()).is_fatal());
        assert!(!SyncError::Other("boom".to_string()).is_fatal());
        assert!(!SyncError::Config("missing key".to_string()).is_fatal());
    }

    // ============================================================================
    // From implementations tests
    // ============================================================================

    #[test]
    fn test_from_string() {
        let err: SyncError = "some error".to_string().into();
        assert!(matches!(err, SyncError::Other(_)));
        assert!(err.to_string().contains("some error"));
    }

    #[test]
    fn test_into_string() {
        let err = SyncError::Config("test".to_string());
        let s: String = err.into();
        assert!(s.contains("configuration error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: SyncError = json_err.into();
        assert!(matches!(err, SyncError::Json(_)));
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
    }
}
