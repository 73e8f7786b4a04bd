//! Errors surfaced by an intercepted call

use std::error::Error as StdError;
use std::fmt;

use txpolicy_core::{Classified, ResourceError};

/// Error returned by an intercepted call
///
/// `Operation` carries the wrapped call's own error unchanged. `Resource`
/// carries a begin/commit/rollback/reset failure; when it happens while a
/// failed call is being resolved, it replaces the call's error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptError<E> {
    /// The wrapped call failed
    Operation(E),
    /// The transactional resource failed
    Resource(ResourceError),
}

impl<E> InterceptError<E> {
    /// The wrapped call's error, if that is what this is
    pub fn into_operation(self) -> Option<E> {
        match self {
            InterceptError::Operation(e) => Some(e),
            InterceptError::Resource(_) => None,
        }
    }

    /// The resource error, if that is what this is
    pub fn as_resource(&self) -> Option<&ResourceError> {
        match self {
            InterceptError::Operation(_) => None,
            InterceptError::Resource(e) => Some(e),
        }
    }

    /// Check if the resource failed
    pub fn is_resource(&self) -> bool {
        matches!(self, InterceptError::Resource(_))
    }

    /// Transform the operation error
    pub fn map_operation<F, U>(self, f: F) -> InterceptError<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            InterceptError::Operation(e) => InterceptError::Operation(f(e)),
            InterceptError::Resource(e) => InterceptError::Resource(e),
        }
    }
}

impl<E> InterceptError<InterceptError<E>> {
    /// Collapse the error of an intercepted call made inside another one
    pub fn flatten(self) -> InterceptError<E> {
        match self {
            InterceptError::Operation(inner) => inner,
            InterceptError::Resource(e) => InterceptError::Resource(e),
        }
    }
}

impl<E> From<ResourceError> for InterceptError<E> {
    fn from(e: ResourceError) -> Self {
        InterceptError::Resource(e)
    }
}

impl<E: fmt::Display> fmt::Display for InterceptError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterceptError::Operation(e) => fmt::Display::fmt(e, f),
            InterceptError::Resource(e) => write!(f, "Resource error: {}", e),
        }
    }
}

impl<E> StdError for InterceptError<E>
where
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            InterceptError::Operation(e) => e.source(),
            InterceptError::Resource(e) => Some(e),
        }
    }
}

impl<E: Classified> Classified for InterceptError<E> {
    fn error_kind(&self) -> &str {
        match self {
            InterceptError::Operation(e) => e.error_kind(),
            InterceptError::Resource(e) => e.error_kind(),
        }
    }
}
