//! Domain error types
//!
//! This module defines the error hierarchy for Strata. All errors are
//! domain-specific and don't expose third-party types.
//!
//! Two families exist on purpose: [`StrataError`] is what resolution
//! surfaces to the caller, while [`StoreError`] describes secret-store
//! failures that the cloud layers consume locally (log and treat the value
//! as absent). There is no `From<StoreError> for StrataError` - a store
//! failure must never abort settings construction.

use thiserror::Error;

/// Main Strata error type
///
/// This is the primary error type returned by settings resolution.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Malformed JSON for a field declared complex
    ///
    /// Raised loudly because it indicates a locally-authored value, not a
    /// transient store failure.
    #[error("error parsing JSON for \"{variable}\": {detail}")]
    JsonParse {
        /// The source variable carrying the malformed value
        variable: String,
        /// Decoder detail
        detail: String,
    },

    /// Schema or resolver misuse, including a missing optional capability
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unreadable or unparsable env file
    #[error("Env file error: {0}")]
    EnvFile(String),

    /// Typed construction of the merged mapping failed
    #[error("Deserialization error: {0}")]
    Deserialize(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Secret-store errors
///
/// Produced by [`SecretStore`](crate::store::SecretStore) implementations.
/// These never propagate out of resolution; the cloud layers log them as
/// warnings and resolve the affected field to absent.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials missing, expired, or rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The store answered with a non-success status
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// The store was unreachable
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store answered, but the payload could not be interpreted
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        StrataError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strata_error_display() {
        let err = StrataError::Configuration("duplicate field".to_string());
        assert_eq!(err.to_string(), "Configuration error: duplicate field");
    }

    #[test]
    fn test_json_parse_error_names_variable() {
        let err = StrataError::JsonParse {
            variable: "opts".to_string(),
            detail: "expected value at line 1".to_string(),
        };
        assert!(err.to_string().contains("\"opts\""));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Api {
            status: 500,
            message: "backend unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - backend unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: StrataError = io_err.into();
        assert!(matches!(err, StrataError::Io(_)));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let err = StrataError::EnvFile("bad line".to_string());
        let _: &dyn std::error::Error = &err;

        let err = StoreError::Authentication("no token".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
