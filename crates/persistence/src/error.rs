//! Error types for the persistence layer.
//!
//! Every storage operation returns a [`StoreResult`]. Failures coming from the
//! underlying store are classified into a small set of kinds so callers can
//! decide whether to retry, report a conflict, or give up.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

/// Result type for all storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The error type for all storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or the connection was lost.
    #[error("connection failed to {backend_name}: {message}")]
    Connection {
        backend_name: String,
        message: String,
    },

    /// A uniqueness, foreign key, or other integrity constraint rejected the write.
    #[error("constraint violation in {backend_name}: {message}")]
    ConstraintViolation {
        backend_name: String,
        constraint: Option<String>,
        message: String,
    },

    /// A row that had to exist was not there.
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// The store or the connection pool gave up waiting.
    #[error("{operation} timed out in {backend_name}: {message}")]
    Timeout {
        backend_name: String,
        operation: String,
        message: String,
    },

    /// Anything else: malformed statements, decode failures, driver bugs.
    #[error("internal error in {backend_name}: {message}")]
    Unknown {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    ConstraintViolation,
    NotFound,
    Timeout,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Connection => "CONNECTION",
            ErrorKind::ConstraintViolation => "CONSTRAINT_VIOLATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

impl StoreError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Connection { .. } => ErrorKind::Connection,
            StoreError::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Timeout { .. } => ErrorKind::Timeout,
            StoreError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Returns true when repeating the call could succeed.
    ///
    /// Nothing in this crate retries; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Connection | ErrorKind::Timeout)
    }

    pub(crate) fn connection(backend_name: &str, message: impl Into<String>) -> Self {
        StoreError::Connection {
            backend_name: backend_name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn constraint(
        backend_name: &str,
        constraint: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        StoreError::ConstraintViolation {
            backend_name: backend_name.to_string(),
            constraint,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &str, key: impl fmt::Display) -> Self {
        StoreError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub(crate) fn timeout(
        backend_name: &str,
        operation: &str,
        message: impl Into<String>,
    ) -> Self {
        StoreError::Timeout {
            backend_name: backend_name.to_string(),
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unknown(backend_name: &str, message: impl Into<String>) -> Self {
        StoreError::Unknown {
            backend_name: backend_name.to_string(),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn with_source(
        backend_name: &str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Unknown {
            backend_name: backend_name.to_string(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
