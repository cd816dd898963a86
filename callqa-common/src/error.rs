//! Common error types for CallQA

use crate::types::CallStatus;
use thiserror::Error;

/// Common result type for CallQA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across CallQA services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter, rejected before any work
    #[error("Validation error: {0}")]
    Validation(String),

    /// Disallowed edge in the call record state machine
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: CallStatus, to: CallStatus },

    /// Operation attempted against a record in an incompatible status
    #[error("Invalid state for operation: {0}")]
    State(String),

    /// Rubric lookup with a category name the rubric does not define
    #[error("Unknown rubric category: {0}")]
    UnknownCategory(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
