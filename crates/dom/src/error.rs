//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. Each variant maps to one process exit code.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    /// Malformed name or parameter supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Illegal tree mutation (re-parenting, cycles, children on leaf nodes)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Wrong document: node {0} belongs to another document")]
    WrongDocument(String),

    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomError {
    /// Process exit code for this error.
    ///
    /// `2` covers structural errors raised by the node model and builder,
    /// `4` an unavailable feature, `5` allocation failure. Everything else
    /// is unclassified (`3`).
    pub fn exit_code(&self) -> u8 {
        match self {
            DomError::InvalidArgument(_)
            | DomError::InvalidState(_)
            | DomError::WrongDocument(_)
            | DomError::NotFound(_) => 2,
            DomError::NotSupported(_) => 4,
            DomError::OutOfMemory(_) => 5,
            DomError::Io(_) | DomError::Config(_) | DomError::Internal(_) => 3,
        }
    }
}

impl DomError {
    /// Numeric DOM exception code, for errors raised by the node model
    ///
    /// `InvalidArgument` is `INVALID_CHARACTER_ERR` (5) since it is only
    /// raised for malformed names and ids. `InvalidState` is
    /// `HIERARCHY_REQUEST_ERR` (3).
    pub fn dom_code(&self) -> Option<u16> {
        match self {
            DomError::InvalidState(_) => Some(3),
            DomError::WrongDocument(_) => Some(4),
            DomError::InvalidArgument(_) => Some(5),
            DomError::NotFound(_) => Some(8),
            DomError::NotSupported(_) => Some(9),
            DomError::Io(_)
            | DomError::OutOfMemory(_)
            | DomError::Config(_)
            | DomError::Internal(_) => None,
        }
    }
}

impl From<std::collections::TryReserveError> for DomError {
    fn from(err: std::collections::TryReserveError) -> Self {
        DomError::OutOfMemory(err.to_string())
    }
}
