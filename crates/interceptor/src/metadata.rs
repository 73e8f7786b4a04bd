//! Declarations and their transactional metadata
//!
//! A [`MethodDecl`] identifies the call being intercepted. A
//! [`MetadataProvider`] answers which [`PolicyDescriptor`] is attached to the
//! method itself and to its declaring class.

use std::collections::HashMap;
use std::fmt;

use txpolicy_core::PolicyDescriptor;

/// Method visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Callable from outside the service
    #[default]
    Public,
    /// Callable from the service and its extensions
    Protected,
    /// Callable from the service only
    Private,
}

/// A service type whose methods may be intercepted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassDecl {
    name: String,
    transactional_aware: bool,
}

impl ClassDecl {
    /// Declare a class without the transactional-aware marker
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transactional_aware: false,
        }
    }

    /// Mark the class as opting in to interception under strict mode
    pub fn transactional_aware(mut self) -> Self {
        self.transactional_aware = true;
        self
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the class carries the transactional-aware marker
    pub fn is_transactional_aware(&self) -> bool {
        self.transactional_aware
    }
}

/// A method of a [`ClassDecl`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDecl {
    class: ClassDecl,
    name: String,
    visibility: Visibility,
}

impl MethodDecl {
    /// Declare a public method
    pub fn new(class: ClassDecl, name: impl Into<String>) -> Self {
        Self {
            class,
            name: name.into(),
            visibility: Visibility::Public,
        }
    }

    /// Change the visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Declaring class
    pub fn class(&self) -> &ClassDecl {
        &self.class
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Visibility
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the method is externally callable
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

impl fmt::Display for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class.name, self.name)
    }
}

/// Source of method- and class-level descriptors
pub trait MetadataProvider {
    /// Descriptor attached to the method itself
    fn method_policy(&self, method: &MethodDecl) -> Option<&PolicyDescriptor>;

    /// Descriptor attached to the class
    fn class_policy(&self, class: &ClassDecl) -> Option<&PolicyDescriptor>;
}

impl<M: MetadataProvider + ?Sized> MetadataProvider for &M {
    fn method_policy(&self, method: &MethodDecl) -> Option<&PolicyDescriptor> {
        (**self).method_policy(method)
    }

    fn class_policy(&self, class: &ClassDecl) -> Option<&PolicyDescriptor> {
        (**self).class_policy(class)
    }
}

/// Descriptor governing a method: the method's own, else its class's
///
/// The class is only consulted when the method has no descriptor, and the
/// chosen descriptor is used as a whole; fields are never merged across
/// levels.
pub fn lookup_descriptor<'a, M>(metadata: &'a M, method: &MethodDecl) -> Option<&'a PolicyDescriptor>
where
    M: MetadataProvider + ?Sized,
{
    metadata
        .method_policy(method)
        .or_else(|| metadata.class_policy(method.class()))
}

/// In-memory table of descriptors keyed by class and method name
///
/// Populated once while wiring services, then read-only.
///
/// # Example
///
/// ```
/// use txpolicy_core::{Policy, PolicyDescriptor};
/// use txpolicy_interceptor::{AnnotationRegistry, ClassDecl, MethodDecl, lookup_descriptor};
///
/// let registry = AnnotationRegistry::new()
///     .annotate_class("OrderService", PolicyDescriptor::with_policy(Policy::Required))
///     .annotate_method("OrderService", "audit", PolicyDescriptor::with_policy(Policy::Nested));
///
/// let audit = MethodDecl::new(ClassDecl::new("OrderService"), "audit");
/// let policy = lookup_descriptor(&registry, &audit).and_then(|d| d.policy());
/// assert_eq!(policy, Some(Policy::Nested));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnnotationRegistry {
    classes: HashMap<String, PolicyDescriptor>,
    methods: HashMap<String, HashMap<String, PolicyDescriptor>>,
}

impl AnnotationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a descriptor to a class, replacing any previous one
    pub fn annotate_class(mut self, class: impl Into<String>, descriptor: PolicyDescriptor) -> Self {
        self.classes.insert(class.into(), descriptor);
        self
    }

    /// Attach a descriptor to a method, replacing any previous one
    pub fn annotate_method(
        mut self,
        class: impl Into<String>,
        method: impl Into<String>,
        descriptor: PolicyDescriptor,
    ) -> Self {
        self.methods
            .entry(class.into())
            .or_default()
            .insert(method.into(), descriptor);
        self
    }

    /// Number of annotated classes and methods
    pub fn len(&self) -> usize {
        self.classes.len() + self.methods.values().map(HashMap::len).sum::<usize>()
    }

    /// Check if nothing is annotated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataProvider for AnnotationRegistry {
    fn method_policy(&self, method: &MethodDecl) -> Option<&PolicyDescriptor> {
        self.methods
            .get(method.class().name())
            .and_then(|methods| methods.get(method.name()))
    }

    fn class_policy(&self, class: &ClassDecl) -> Option<&PolicyDescriptor> {
        self.classes.get(class.name())
    }
}
