//! Declarative transaction boundaries
//!
//! This crate wraps service calls in the transaction their policy asks for:
//! - TransactionInterceptor: begin / commit / rollback around one call
//! - TransactionalPointcut: which calls are intercepted at all
//! - TransactionalProxy: pointcut and interceptor behind one entry point
//! - TransactionalResource: the session the transactions run on
//!
//! Policies come from a [`MetadataProvider`]: the method's own descriptor
//! wins over its class's, and unset fields fall back to the
//! [`TransactionConfig`](txpolicy_core::TransactionConfig) defaults.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod frame;
pub mod interceptor;
pub mod metadata;
pub mod metrics;
pub mod pointcut;
pub mod proxy;
pub mod resolution;
pub mod resource;

pub use error::InterceptError;
pub use frame::{FrameState, RollbackOutcome, TransactionFrame};
pub use interceptor::TransactionInterceptor;
pub use metadata::{
    lookup_descriptor, AnnotationRegistry, ClassDecl, MetadataProvider, MethodDecl, Visibility,
};
pub use metrics::{InterceptorMetrics, MetricsSnapshot};
pub use pointcut::TransactionalPointcut;
pub use proxy::TransactionalProxy;
pub use resolution::{is_rollback_enabled, matching_no_rollback, resolve, EffectivePolicy, Resolution};
pub use resource::{InMemoryResource, ResourceStats, TransactionalResource};
