//! Transaction interceptor
//!
//! Wraps one call in the transaction its policy asks for:
//! - Resolves the descriptor (method first, then class) against the config
//! - Begins a transaction when the policy requires one
//! - Commits on success
//! - On failure, rolls back unless the error kind is in the no-rollback list,
//!   in which case it commits, then returns the call's error unchanged
//!
//! A flush or commit failure after a successful call is settled like a
//! failed call of kind `ResourceError`, then returned. A resource failure
//! while settling replaces the error being settled.

use std::sync::Arc;

use tracing::{debug, warn};
use txpolicy_core::{Classified, CoreResult, KindRegistry, ResourceResult, TransactionConfig};

use crate::error::InterceptError;
use crate::frame::{FrameState, RollbackOutcome, TransactionFrame};
use crate::metadata::{lookup_descriptor, MetadataProvider, MethodDecl};
use crate::metrics::{InterceptorMetrics, MetricsSnapshot};
use crate::resolution::{matching_no_rollback, resolve, Resolution};
use crate::resource::TransactionalResource;

/// Transaction interceptor
///
/// Immutable after construction and safe to share across threads; each call
/// brings its own resource.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use txpolicy_core::{KindRegistry, Policy, PolicyDescriptor, ResourceError, TransactionConfig};
/// use txpolicy_interceptor::{
///     AnnotationRegistry, ClassDecl, InMemoryResource, MethodDecl, TransactionInterceptor,
/// };
///
/// let metadata = AnnotationRegistry::new()
///     .annotate_class("OrderService", PolicyDescriptor::with_policy(Policy::Required));
/// let interceptor = TransactionInterceptor::new(
///     Arc::new(TransactionConfig::default()),
///     Arc::new(KindRegistry::new()),
///     metadata,
/// )?;
///
/// let place = MethodDecl::new(ClassDecl::new("OrderService"), "place");
/// let mut session = InMemoryResource::new();
/// let id = interceptor
///     .intercept(&place, &mut session, |_session| Ok::<_, ResourceError>(42))
///     .unwrap();
///
/// assert_eq!(id, 42);
/// assert_eq!(session.stats().commits, 1);
/// # Ok::<(), txpolicy_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct TransactionInterceptor<M> {
    config: Arc<TransactionConfig>,
    kinds: Arc<KindRegistry>,
    metadata: M,
    metrics: InterceptorMetrics,
}

impl<M: MetadataProvider> TransactionInterceptor<M> {
    /// Create an interceptor
    ///
    /// # Errors
    ///
    /// Returns the validation error of the configuration's default
    /// no-rollback list, if any.
    pub fn new(
        config: Arc<TransactionConfig>,
        kinds: Arc<KindRegistry>,
        metadata: M,
    ) -> CoreResult<Self> {
        config.validate(&kinds)?;
        Ok(Self {
            config,
            kinds,
            metadata,
            metrics: InterceptorMetrics::new(),
        })
    }

    /// Global configuration
    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Error kind registry
    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// Metadata provider
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Resolve the policy of a call against the current resource state
    ///
    /// The resource is only queried when a descriptor exists. Has no side
    /// effects: no logging, no metrics.
    pub fn resolve<R>(&self, method: &MethodDecl, resource: &R) -> Resolution<'_>
    where
        R: TransactionalResource + ?Sized,
    {
        match lookup_descriptor(&self.metadata, method) {
            None => resolve(None, &self.config, false),
            Some(descriptor) => {
                resolve(Some(descriptor), &self.config, resource.is_transaction_active())
            }
        }
    }

    /// Run `operation` inside the transaction its policy asks for
    ///
    /// The operation receives the resource, so intercepted calls made from
    /// inside it share the same session.
    ///
    /// # Errors
    ///
    /// - `InterceptError::Operation` with the operation's error, after the
    ///   transaction was committed or rolled back
    /// - `InterceptError::Resource` if begin, flush, commit, rollback or reset
    ///   failed
    pub fn intercept<R, T, E, F>(
        &self,
        method: &MethodDecl,
        resource: &mut R,
        operation: F,
    ) -> Result<T, InterceptError<E>>
    where
        R: TransactionalResource + ?Sized,
        E: Classified,
        F: FnOnce(&mut R) -> Result<T, E>,
    {
        let resolution = self.resolve(method, &*resource);
        if matches!(resolution, Resolution::PassThrough) {
            // The gate in front of the interceptor should have filtered this call out
            warn!(
                target: "txpolicy::tx",
                method = %method,
                "Transactional interceptor was invoked, but no descriptor was found for the method"
            );
            self.metrics.record_pass_through();
        }
        let mut frame = TransactionFrame::new(method.to_string());

        if resolution.transaction_required() {
            frame.begin(resource)?;
            self.metrics.record_begin();
        }

        debug!(target: "txpolicy::tx", method = %method, policy = %resolution.policy(), "invoking");
        match operation(&mut *resource) {
            Ok(value) => {
                if frame.state() == FrameState::Open {
                    if let Err(commit_error) = frame.commit(resource) {
                        self.settle_failure(
                            &mut frame,
                            resource,
                            commit_error.error_kind(),
                            &resolution,
                        )?;
                        return Err(InterceptError::Resource(commit_error));
                    }
                    self.metrics.record_commit();
                }
                Ok(value)
            }
            Err(error) => {
                if frame.state() == FrameState::Open {
                    self.settle_failure(&mut frame, resource, error.error_kind(), &resolution)?;
                }
                Err(InterceptError::Operation(error))
            }
        }
    }

    /// Commit or roll back an open frame after a failure of kind `kind`
    fn settle_failure<R>(
        &self,
        frame: &mut TransactionFrame,
        resource: &mut R,
        kind: &str,
        resolution: &Resolution<'_>,
    ) -> ResourceResult<()>
    where
        R: TransactionalResource + ?Sized,
    {
        match matching_no_rollback(&self.kinds, kind, resolution.no_rollback_exceptions()) {
            Some(entry) => {
                debug!(
                    target: "txpolicy::tx",
                    method = %frame.method(),
                    error_kind = kind,
                    matched = entry,
                    "No rollback for error"
                );
                frame.commit(resource)?;
                self.metrics.record_commit_despite_failure();
            }
            None => {
                debug!(
                    target: "txpolicy::tx",
                    method = %frame.method(),
                    error_kind = kind,
                    "Error causes rollback"
                );
                let outcome = frame.rollback(resource)?;
                self.metrics
                    .record_rollback(outcome == RollbackOutcome::SessionReset);
            }
        }
        Ok(())
    }
}
