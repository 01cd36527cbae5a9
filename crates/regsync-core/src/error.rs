//! Error types for the regsync system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for regsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the regsync system
#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be built or sent (connection refused, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The registrar answered with a status >= 400
    ///
    /// The body is kept verbatim; no structured error parsing is attempted.
    #[error("API request failed with status {status}: {body}")]
    Api {
        /// HTTP status code returned by the registrar
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A declaration violates a constraint checked before contacting the registrar
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// No manager is registered for the given resource kind identifier
    #[error("Unknown resource kind: {0}")]
    UnknownResourceKind(String),

    /// A plan stopped part-way through
    ///
    /// `applied` operations already reached the registrar and were not rolled back.
    #[error("Operation {operation} failed after {applied}/{total} operation(s) applied: {source}")]
    Execution {
        /// Number of operations that succeeded before the failure
        applied: usize,
        /// Number of operations in the plan
        total: usize,
        /// Description of the failing operation
        operation: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an API error from a status code and raw body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Remote status code, if this error (or the failure it wraps) came from the registrar
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Execution { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the error was raised before any request was issued
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_body_verbatim() {
        let err = Error::api(422, r#"{"message":"invalid hostname"}"#);
        assert_eq!(
            err.to_string(),
            r#"API request failed with status 422: {"message":"invalid hostname"}"#
        );
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn execution_error_exposes_inner_status() {
        let err = Error::Execution {
            applied: 1,
            total: 2,
            operation: "create nameservers on example.com".to_string(),
            source: Box::new(Error::api(500, "boom")),
        };
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("1/2"));
    }
}
