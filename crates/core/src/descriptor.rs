//! Policy descriptors
//!
//! A descriptor is the validated form of the transactional metadata attached
//! to a method or a class. Both of its fields are optional; an unset field
//! falls back to the global configuration at call time.

use std::collections::BTreeSet;

use crate::error::CoreResult;
use crate::kind::KindRegistry;
use crate::policy::Policy;

/// Raw transactional metadata, before validation
///
/// # Example
///
/// ```
/// use txpolicy_core::{KindRegistry, PolicyDescriptor, PolicyOptions};
///
/// let mut kinds = KindRegistry::new();
/// kinds.register_error("NotFound")?;
///
/// let options = PolicyOptions::new()
///     .policy(3)
///     .no_rollback_exceptions(["NotFound", "NotFound"]);
/// let descriptor = PolicyDescriptor::new(options, &kinds)?;
/// assert_eq!(descriptor.no_rollback_exceptions().map(|s| s.len()), Some(1));
/// # Ok::<(), txpolicy_core::CoreError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyOptions {
    /// Raw policy code
    pub policy: Option<i64>,
    /// Error kind identifiers that must not trigger a rollback
    pub no_rollback_exceptions: Option<Vec<String>>,
}

impl PolicyOptions {
    /// Options with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw policy code
    pub fn policy(mut self, code: i64) -> Self {
        self.policy = Some(code);
        self
    }

    /// Set the no-rollback list
    pub fn no_rollback_exceptions<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_rollback_exceptions = Some(kinds.into_iter().map(Into::into).collect());
        self
    }
}

/// Validated transactional metadata for one declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDescriptor {
    policy: Option<Policy>,
    no_rollback_exceptions: Option<BTreeSet<String>>,
}

impl PolicyDescriptor {
    /// Validate raw options
    ///
    /// Duplicate no-rollback entries are collapsed before validation.
    ///
    /// # Errors
    ///
    /// - `InvalidPolicy` if the policy code is not 1, 2 or 3
    /// - `UnknownType` if a no-rollback entry is not registered
    /// - `NotAnExceptionType` if a no-rollback entry is not an error kind
    pub fn new(options: PolicyOptions, kinds: &KindRegistry) -> CoreResult<Self> {
        let policy = options.policy.map(Policy::from_code).transpose()?;

        let no_rollback_exceptions = match options.no_rollback_exceptions {
            Some(entries) => Some(validate_no_rollback(entries, kinds)?),
            None => None,
        };

        Ok(Self {
            policy,
            no_rollback_exceptions,
        })
    }

    /// Descriptor with both fields unset (everything from configuration)
    pub fn unset() -> Self {
        Self::default()
    }

    /// Descriptor with an explicit policy and the default no-rollback list
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy: Some(policy),
            no_rollback_exceptions: None,
        }
    }

    /// Replace the no-rollback list
    ///
    /// # Errors
    ///
    /// Same as the no-rollback part of [`PolicyDescriptor::new`].
    pub fn with_no_rollback<I, S>(mut self, entries: I, kinds: &KindRegistry) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_rollback_exceptions = Some(validate_no_rollback(entries, kinds)?);
        Ok(self)
    }

    /// Policy, or `None` to use the configured default
    pub fn policy(&self) -> Option<Policy> {
        self.policy
    }

    /// No-rollback list, or `None` to use the configured default list
    pub fn no_rollback_exceptions(&self) -> Option<&BTreeSet<String>> {
        self.no_rollback_exceptions.as_ref()
    }
}

fn validate_no_rollback<I, S>(entries: I, kinds: &KindRegistry) -> CoreResult<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let unique: BTreeSet<String> = entries.into_iter().map(Into::into).collect();
    for kind in &unique {
        kinds.validate_error_kind(kind)?;
    }
    Ok(unique)
}
