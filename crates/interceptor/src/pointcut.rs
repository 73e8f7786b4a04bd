//! Matching gate in front of the interceptor
//!
//! A class matches when strict mode is off or the class carries the
//! transactional-aware marker. A method matches when it is public and a
//! method- or class-level descriptor exists.

use tracing::debug;
use txpolicy_core::{Policy, TransactionConfig};

use crate::metadata::{lookup_descriptor, ClassDecl, MetadataProvider, MethodDecl};

/// Decides which calls reach the interceptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionalPointcut {
    strict_mode: bool,
}

impl TransactionalPointcut {
    /// Build the gate from the global configuration
    pub fn new(config: &TransactionConfig) -> Self {
        Self {
            strict_mode: config.strict_mode,
        }
    }

    /// Whether only marked classes are intercepted
    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Whether methods of this class may be intercepted
    pub fn matches_class(&self, class: &ClassDecl) -> bool {
        !self.strict_mode || class.is_transactional_aware()
    }

    /// Whether this method is intercepted
    pub fn matches_method<M>(&self, method: &MethodDecl, metadata: &M) -> bool
    where
        M: MetadataProvider + ?Sized,
    {
        if !method.is_public() {
            return false;
        }
        let Some(descriptor) = lookup_descriptor(metadata, method) else {
            return false;
        };

        let policy = descriptor.policy().map_or("default", Policy::label);
        let no_rollback = descriptor
            .no_rollback_exceptions()
            .map_or_else(
                || "default".to_string(),
                |kinds| kinds.iter().map(String::as_str).collect::<Vec<_>>().join(", "),
            );
        debug!(target: "txpolicy::tx", method = %method, policy, "TX policy");
        debug!(target: "txpolicy::tx", method = %method, no_rollback = %no_rollback, "TX no-rollback exceptions");
        true
    }

    /// Whether a call to this method goes through the interceptor
    pub fn matches<M>(&self, method: &MethodDecl, metadata: &M) -> bool
    where
        M: MetadataProvider + ?Sized,
    {
        self.matches_class(method.class()) && self.matches_method(method, metadata)
    }
}
