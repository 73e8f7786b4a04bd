//! Error types for txpolicy
//!
//! This module defines the errors raised while building policy metadata and
//! the errors reported by transactional resources.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::kind::{Classified, RESOURCE_ERROR_KIND};

/// Result type alias for descriptor, registry and configuration operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Result type alias for transactional resource operations
pub type ResourceResult<T> = std::result::Result<T, ResourceError>;

/// Errors raised while validating policy metadata or configuration
///
/// All of these surface before any call traffic: at descriptor construction,
/// kind registration or configuration loading.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Policy value outside the allowed set
    #[error("Invalid policy: \"{value}\", must be one of [{allowed}]")]
    InvalidPolicy {
        /// Offending raw value
        value: String,
        /// Allowed values, comma separated
        allowed: String,
    },

    /// Type identifier is not registered
    #[error("Type not found: '{0}'")]
    UnknownType(String),

    /// Type identifier is registered but is not an error kind
    #[error("Not an error type: '{0}'")]
    NotAnExceptionType(String),

    /// Kind registered twice with different parents
    #[error("Kind '{name}' is already registered under {existing}, cannot move it under {requested}")]
    ConflictingKind {
        /// Kind name
        name: String,
        /// Parent already on record
        existing: String,
        /// Parent requested by the second registration
        requested: String,
    },

    /// Configuration could not be parsed or serialized
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while reading or writing configuration files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Build an `InvalidPolicy` error from a raw value and the allowed set
    pub fn invalid_policy(value: impl fmt::Display, allowed: &[impl fmt::Display]) -> Self {
        CoreError::InvalidPolicy {
            value: value.to_string(),
            allowed: allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Build a `Config` error
    pub fn config(msg: impl Into<String>) -> Self {
        CoreError::Config(msg.into())
    }
}

/// Operations a transactional resource exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOp {
    /// Open a transaction (or increase nesting)
    Begin,
    /// Push pending writes to the backing store
    Flush,
    /// Commit the innermost transaction
    Commit,
    /// Roll back the innermost transaction
    Rollback,
    /// Close the session and prepare a fresh one
    Reset,
}

impl fmt::Display for ResourceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceOp::Begin => "begin",
            ResourceOp::Flush => "flush",
            ResourceOp::Commit => "commit",
            ResourceOp::Rollback => "rollback",
            ResourceOp::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Failure reported by a transactional resource
///
/// Never retried by the interceptor. When raised while resolving a failed
/// call, it replaces the call's own error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The resource refused or failed the operation
    #[error("{op} failed: {reason}")]
    Failed {
        /// Operation that failed
        op: ResourceOp,
        /// Human-readable reason
        reason: String,
    },

    /// Operation is not valid in the current transaction state
    #[error("cannot {op} in state {state}")]
    InvalidState {
        /// Operation attempted
        op: ResourceOp,
        /// State the transaction was in
        state: String,
    },
}

impl ResourceError {
    /// Build a `Failed` error
    pub fn failed(op: ResourceOp, reason: impl Into<String>) -> Self {
        ResourceError::Failed {
            op,
            reason: reason.into(),
        }
    }

    /// Build an `InvalidState` error
    pub fn invalid_state(op: ResourceOp, state: impl fmt::Display) -> Self {
        ResourceError::InvalidState {
            op,
            state: state.to_string(),
        }
    }

    /// Operation the error relates to
    pub fn op(&self) -> ResourceOp {
        match self {
            ResourceError::Failed { op, .. } | ResourceError::InvalidState { op, .. } => *op,
        }
    }
}

impl Classified for ResourceError {
    fn error_kind(&self) -> &str {
        RESOURCE_ERROR_KIND
    }
}
