//! txpolicy - declarative transaction boundaries
//!
//! Service methods declare a transaction policy (`NotRequired`, `Required` or
//! `Nested`) and a list of error kinds that should not roll back. The
//! interceptor resolves that policy against the global configuration and the
//! session's current state, then begins, commits or rolls back around the
//! call.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use txpolicy::{
//!     AnnotationRegistry, ClassDecl, InMemoryResource, KindRegistry, MethodDecl, Policy,
//!     PolicyDescriptor, ResourceError, TransactionConfig, TransactionInterceptor,
//!     TransactionalProxy,
//! };
//!
//! let metadata = AnnotationRegistry::new()
//!     .annotate_class("AccountService", PolicyDescriptor::with_policy(Policy::Required));
//! let interceptor = TransactionInterceptor::new(
//!     Arc::new(TransactionConfig::default()),
//!     Arc::new(KindRegistry::new()),
//!     metadata,
//! )?;
//! let proxy = TransactionalProxy::new(interceptor);
//!
//! let deposit = MethodDecl::new(ClassDecl::new("AccountService"), "deposit");
//! let mut session = InMemoryResource::new();
//! proxy
//!     .invoke(&deposit, &mut session, |_| Ok::<_, ResourceError>(()))
//!     .unwrap();
//!
//! assert_eq!(session.stats().commits, 1);
//! # Ok::<(), txpolicy::CoreError>(())
//! ```
//!
//! # Architecture
//!
//! `txpolicy-core` holds the data (policies, descriptors, error kinds,
//! configuration). `txpolicy-interceptor` holds the behavior. Both are
//! re-exported here.

pub use txpolicy_core::{
    Classified, CoreError, CoreResult, KindRegistry, Policy, PolicyDescriptor, PolicyOptions,
    ResourceError, ResourceOp, ResourceResult, TransactionConfig, CONFIG_FILE_NAME,
    RESOURCE_ERROR_KIND, ROOT_ERROR_KIND,
};
pub use txpolicy_interceptor::{
    is_rollback_enabled, lookup_descriptor, matching_no_rollback, resolve, AnnotationRegistry,
    ClassDecl, EffectivePolicy, FrameState, InMemoryResource, InterceptError, InterceptorMetrics,
    MetadataProvider, MethodDecl, MetricsSnapshot, Resolution, ResourceStats, RollbackOutcome,
    TransactionFrame, TransactionInterceptor, TransactionalPointcut, TransactionalProxy,
    TransactionalResource, Visibility,
};
