//! Policy resolution and rollback decisions
//!
//! Pure functions of the descriptor, the configuration, the transaction
//! activity of the resource and the failing error's kind.

use std::collections::BTreeSet;

use txpolicy_core::{KindRegistry, Policy, PolicyDescriptor, TransactionConfig};

/// Effective policy of one intercepted call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectivePolicy<'a> {
    /// Descriptor policy, else the configured default
    pub policy: Policy,
    /// Descriptor list, else the configured default list
    pub no_rollback_exceptions: &'a BTreeSet<String>,
    /// Whether this call begins a transaction
    pub transaction_required: bool,
}

impl<'a> EffectivePolicy<'a> {
    /// Resolve a descriptor against the configuration
    pub fn resolve(
        descriptor: &'a PolicyDescriptor,
        config: &'a TransactionConfig,
        transaction_active: bool,
    ) -> Self {
        let policy = descriptor.policy().unwrap_or(config.default_policy);
        let no_rollback_exceptions = descriptor
            .no_rollback_exceptions()
            .unwrap_or(&config.no_rollback_exceptions);
        Self {
            policy,
            no_rollback_exceptions,
            transaction_required: policy.requires_transaction(transaction_active),
        }
    }
}

/// Outcome of policy resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// No descriptor: the call runs in whatever context already exists
    PassThrough,
    /// A descriptor governs the call
    Transactional(EffectivePolicy<'a>),
}

impl<'a> Resolution<'a> {
    /// Whether this call begins a transaction
    pub fn transaction_required(&self) -> bool {
        match self {
            Resolution::PassThrough => false,
            Resolution::Transactional(effective) => effective.transaction_required,
        }
    }

    /// No-rollback list in effect, `None` for a pass-through call
    pub fn no_rollback_exceptions(&self) -> Option<&'a BTreeSet<String>> {
        match self {
            Resolution::PassThrough => None,
            Resolution::Transactional(effective) => Some(effective.no_rollback_exceptions),
        }
    }

    /// Policy in effect; a pass-through call behaves as `NotRequired`
    pub fn policy(&self) -> Policy {
        match self {
            Resolution::PassThrough => Policy::NotRequired,
            Resolution::Transactional(effective) => effective.policy,
        }
    }
}

/// Resolve the policy of a call
pub fn resolve<'a>(
    descriptor: Option<&'a PolicyDescriptor>,
    config: &'a TransactionConfig,
    transaction_active: bool,
) -> Resolution<'a> {
    match descriptor {
        None => Resolution::PassThrough,
        Some(descriptor) => Resolution::Transactional(EffectivePolicy::resolve(
            descriptor,
            config,
            transaction_active,
        )),
    }
}

/// First no-rollback entry matching an error kind
///
/// An entry matches when the kind is that entry or descends from it.
pub fn matching_no_rollback<'a>(
    kinds: &KindRegistry,
    error_kind: &str,
    no_rollback_exceptions: Option<&'a BTreeSet<String>>,
) -> Option<&'a str> {
    no_rollback_exceptions?
        .iter()
        .find(|entry| kinds.is_a(error_kind, entry))
        .map(String::as_str)
}

/// Whether a failure of the given kind rolls the transaction back
pub fn is_rollback_enabled(
    kinds: &KindRegistry,
    error_kind: &str,
    no_rollback_exceptions: Option<&BTreeSet<String>>,
) -> bool {
    matching_no_rollback(kinds, error_kind, no_rollback_exceptions).is_none()
}
