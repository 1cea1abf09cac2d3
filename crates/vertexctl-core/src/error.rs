//! Unified error handling for vertexctl-core
//!
//! Errors fall into three groups:
//!
//! - local validation failures, raised before any network call
//! - remote-call failures (HTTP status errors and transport errors), passed
//!   through unchanged
//! - long-running operation failures, raised only once polling has finished
//!
//! # Example
//!
//! ```rust
//! use vertexctl_core::CoreError;
//!
//! fn handle_error(err: CoreError) {
//!     if err.is_not_found() {
//!         println!("Resource not found");
//!     } else if err.is_retryable() {
//!         println!("Temporary error, can retry");
//!     }
//! }
//!
//! let err = CoreError::Api {
//!     status: 404,
//!     code: Some("NOT_FOUND".to_string()),
//!     message: "Index not found".to_string(),
//! };
//! assert!(err.is_not_found());
//! ```

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Core error type for every remote and local failure
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required field is missing or malformed; no request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The service answered with a non-success HTTP status
    #[error("API error ({status}{}): {message}", code_suffix(.code))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A long-running operation finished with an error status
    #[error("Operation {name} failed with code {code}: {message}")]
    OperationFailed {
        name: String,
        code: i32,
        message: String,
        details: Vec<Value>,
    },

    /// A caller-supplied polling timeout elapsed
    #[error("Operation timed out after {0:?}")]
    OperationTimeout(Duration),

    /// A response body could not be decoded
    #[error("Invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" {c}")).unwrap_or_default()
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Build a validation error for a required field that was left empty
    pub(crate) fn missing(field: &str) -> Self {
        CoreError::Validation(format!("`{field}` is required"))
    }

    fn status(&self) -> Option<u16> {
        match self {
            CoreError::Api { status, .. } => Some(*status),
            CoreError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::OperationFailed { code, .. } => *code == 5,
            _ => self.status() == Some(404),
        }
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Returns true if this is a timeout error
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Transport(e) => e.is_timeout(),
            CoreError::OperationTimeout(_) => true,
            CoreError::OperationFailed { code, .. } => *code == 4,
            _ => false,
        }
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Returns true if this is a conflict/precondition error (409/412)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(409) | Some(412))
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::Validation(_) => true,
            _ => self.status() == Some(400),
        }
    }

    /// Returns true if this error is potentially retryable
    ///
    /// Nothing in this crate retries on its own; this is for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Transport(e) => e.is_timeout() || e.is_connect(),
            CoreError::OperationTimeout(_) => true,
            _ => self.is_rate_limited() || self.is_server_error(),
        }
    }
}
