//! Error kind hierarchy
//!
//! No-rollback lists name error kinds by string identifier. A kind matches an
//! entry when it is that entry or descends from it, so the registry keeps the
//! parent of every known identifier.
//!
//! Identifiers that do not descend from [`ROOT_ERROR_KIND`] can still be
//! registered. They model types that exist but are not errors, and are
//! rejected wherever an error kind is expected.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};

/// Root of every error kind
pub const ROOT_ERROR_KIND: &str = "Error";

/// Kind reported by [`crate::ResourceError`]
pub const RESOURCE_ERROR_KIND: &str = "ResourceError";

/// Errors that can be matched against a no-rollback list
pub trait Classified {
    /// Identifier of this error's kind, as registered in a [`KindRegistry`]
    fn error_kind(&self) -> &str;
}

/// Registry of type identifiers and their parents
#[derive(Debug, Clone)]
pub struct KindRegistry {
    parents: HashMap<String, Option<String>>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KindRegistry {
    /// Create a registry holding the root error kind and the resource error kind
    pub fn new() -> Self {
        let mut parents = HashMap::new();
        parents.insert(ROOT_ERROR_KIND.to_string(), None);
        parents.insert(
            RESOURCE_ERROR_KIND.to_string(),
            Some(ROOT_ERROR_KIND.to_string()),
        );
        Self { parents }
    }

    /// Register a type identifier with an optional parent
    ///
    /// Registering the same identifier twice with the same parent is a no-op.
    ///
    /// # Errors
    ///
    /// - `UnknownType` if the parent is not registered
    /// - `ConflictingKind` if the identifier is already registered under
    ///   another parent
    pub fn register(&mut self, name: &str, parent: Option<&str>) -> CoreResult<&mut Self> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(CoreError::UnknownType(parent.to_string()));
            }
        }

        if let Some(existing) = self.parents.get(name) {
            if existing.as_deref() == parent {
                return Ok(self);
            }
            return Err(CoreError::ConflictingKind {
                name: name.to_string(),
                existing: describe_parent(existing.as_deref()),
                requested: describe_parent(parent),
            });
        }

        self.parents
            .insert(name.to_string(), parent.map(str::to_string));
        Ok(self)
    }

    /// Register an error kind directly under the root error kind
    pub fn register_error(&mut self, name: &str) -> CoreResult<&mut Self> {
        self.register(name, Some(ROOT_ERROR_KIND))
    }

    /// Check whether an identifier is registered
    pub fn contains(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    /// Parent of a registered identifier
    pub fn parent(&self, name: &str) -> Option<&str> {
        self.parents.get(name).and_then(|p| p.as_deref())
    }

    /// Whether `kind` is `ancestor` or descends from it
    ///
    /// Unregistered kinds only match themselves.
    pub fn is_a(&self, kind: &str, ancestor: &str) -> bool {
        let mut current = Some(kind);
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.parent(name);
        }
        false
    }

    /// Whether an identifier names the root error kind or one of its descendants
    pub fn is_error_kind(&self, name: &str) -> bool {
        self.contains(name) && self.is_a(name, ROOT_ERROR_KIND)
    }

    /// Check that an identifier can be used in a no-rollback list
    ///
    /// # Errors
    ///
    /// - `UnknownType` if the identifier is not registered
    /// - `NotAnExceptionType` if it is registered outside the error hierarchy
    pub fn validate_error_kind(&self, name: &str) -> CoreResult<()> {
        if !self.contains(name) {
            return Err(CoreError::UnknownType(name.to_string()));
        }
        if !self.is_a(name, ROOT_ERROR_KIND) {
            return Err(CoreError::NotAnExceptionType(name.to_string()));
        }
        Ok(())
    }

    /// Number of registered identifiers
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the registry is empty (never true for a registry built by `new`)
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

fn describe_parent(parent: Option<&str>) -> String {
    match parent {
        Some(p) => format!("'{}'", p),
        None => "no parent".to_string(),
    }
}
