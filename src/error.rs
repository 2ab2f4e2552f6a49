// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for sessionjar
//!
//! Every failure the engine can surface to a caller. Capture-path errors carry
//! the host they happened on so a failing host can be reported without
//! aborting the rest of a poll round.

use thiserror::Error;

/// Result type alias for sessionjar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sessionjar
#[derive(Error, Debug)]
pub enum Error {
    /// Domain could not be normalized to a non-empty host
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    /// Control request named an action nobody handles
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Control request for a known action with a bad payload
    #[error("Malformed request for {action}: {reason}")]
    MalformedRequest { action: String, reason: String },

    /// Durable state could not be read or written
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Cookie or header source failed for one host
    #[error("Capture source failed for {host}: {reason}")]
    CaptureSource { host: String, reason: String },

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        host: Option<String>,
    },

    /// The engine task has shut down
    #[error("Capture engine has been closed")]
    EngineClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid domain error
    pub fn invalid_domain(raw: impl Into<String>) -> Self {
        Error::InvalidDomain(raw.into())
    }

    /// Create a malformed request error
    pub fn malformed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedRequest {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Error::Persistence(msg.into())
    }

    /// Create a capture source error
    pub fn capture_source(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::CaptureSource {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            host: None,
        }
    }

    /// Create a timeout error with host
    pub fn timeout_with_host(
        operation: impl Into<String>,
        duration_ms: u64,
        host: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            host: Some(host.into()),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Errors caused by the caller's input rather than the environment
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidDomain(_) | Error::UnknownAction(_) | Error::MalformedRequest { .. }
        )
    }

    /// Check if a later attempt may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::CaptureSource { .. } | Error::Persistence(_) | Error::Io(_)
        )
    }

    /// Get host if available
    pub fn host(&self) -> Option<&str> {
        match self {
            Error::CaptureSource { host, .. } => Some(host),
            Error::Timeout { host: Some(h), .. } => Some(h),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Attribute a failure to a host, turning it into a capture source error
    fn with_host(self, host: &str) -> Result<T>;

    /// Wrap a failure as a persistence error
    fn persistence_context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_host(self, host: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Timeout {
                operation,
                duration_ms,
                ..
            } => Error::Timeout {
                operation,
                duration_ms,
                host: Some(host.to_string()),
            },
            err @ Error::CaptureSource { .. } => err,
            other => Error::capture_source(host, other.to_string()),
        })
    }

    fn persistence_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Persistence(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(Error::invalid_domain("  ").is_client_error());
        assert!(Error::UnknownAction("reboot".into()).is_client_error());
        assert!(!Error::persistence("disk full").is_client_error());
    }

    #[test]
    fn test_timeout_with_host() {
        let err: Result<()> = Err(Error::timeout("cookie fetch", 5000));
        let err = err.with_host("example.com").unwrap_err();

        assert!(err.is_timeout());
        assert!(err.is_recoverable());
        assert_eq!(err.host(), Some("example.com"));
    }

    #[test]
    fn test_with_host_wraps_other_errors() {
        let err: std::result::Result<(), &str> = Err("connection reset");
        let err = err.with_host("x.com").unwrap_err();

        match err {
            Error::CaptureSource { host, reason } => {
                assert_eq!(host, "x.com");
                assert_eq!(reason, "connection reset");
            }
            other => panic!("Expected CaptureSource, got {:?}", other),
        }
    }

    #[test]
    fn test_persistence_context() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: std::result::Result<(), std::io::Error> = Err(io);
        let err = err.persistence_context("writing state").unwrap_err();

        assert!(matches!(err, Error::Persistence(ref m) if m.starts_with("writing state")));
    }
}
