//! Reconciliation error types

use crate::client::{RemoteError, RemoteErrorKind};
use std::time::Duration;
use thiserror::Error;

/// Reconciliation errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// Malformed or missing configuration, detected before any remote call.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Remote API rejected the request ({kind}): {message}")]
    RemoteRejected {
        kind: RemoteErrorKind,
        message: String,
    },

    #[error("Remote API temporarily unavailable ({kind}): {message}")]
    RemoteTransient {
        kind: RemoteErrorKind,
        message: String,
    },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource {id} reached status {status} while waiting for {expected}")]
    ConvergenceFailed {
        id: String,
        status: String,
        expected: String,
    },

    #[error("Timeout: resource {id} still {last_status} after {waited:?}")]
    Timeout {
        id: String,
        last_status: String,
        waited: Duration,
    },

    #[error("Resource {id} never became visible within {grace:?}")]
    NeverVisible { id: String, grace: Duration },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Cancelled while waiting for resource {0}")]
    Cancelled(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether the caller may retry the whole operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CloudError::RemoteTransient { .. })
    }
}

impl From<RemoteError> for CloudError {
    fn from(err: RemoteError) -> Self {
        match err.kind {
            RemoteErrorKind::NotFound => CloudError::ResourceNotFound(err.message),
            RemoteErrorKind::Throttled | RemoteErrorKind::TransientNetwork => {
                CloudError::RemoteTransient {
                    kind: err.kind,
                    message: err.message,
                }
            }
            RemoteErrorKind::Unauthorized
            | RemoteErrorKind::Conflict
            | RemoteErrorKind::MalformedInput
            | RemoteErrorKind::Unknown => CloudError::RemoteRejected {
                kind: err.kind,
                message: err.message,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_classification() {
        let err: CloudError = RemoteError::new(RemoteErrorKind::Throttled, "slow down").into();
        assert!(err.is_retryable());

        let err: CloudError = RemoteError::new(RemoteErrorKind::Conflict, "busy").into();
        assert!(matches!(
            err,
            CloudError::RemoteRejected {
                kind: RemoteErrorKind::Conflict,
                ..
            }
        ));
        assert!(!err.is_retryable());

        let err: CloudError = RemoteError::not_found("fleet-1").into();
        assert!(matches!(err, CloudError::ResourceNotFound(ref id) if id == "fleet-1"));
    }
}
