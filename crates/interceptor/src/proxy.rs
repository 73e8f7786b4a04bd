//! Transactional proxy
//!
//! Composes the pointcut and the interceptor into one entry point. Service
//! code routes every call through [`TransactionalProxy::invoke`]; calls the
//! pointcut selects are intercepted, the others run as-is.
//!
//! Match decisions are computed once per method and cached.

use std::collections::HashMap;

use parking_lot::RwLock;
use txpolicy_core::Classified;

use crate::error::InterceptError;
use crate::interceptor::TransactionInterceptor;
use crate::metadata::{MetadataProvider, MethodDecl};
use crate::pointcut::TransactionalPointcut;
use crate::resource::TransactionalResource;

/// Pointcut + interceptor
#[derive(Debug)]
pub struct TransactionalProxy<M> {
    pointcut: TransactionalPointcut,
    interceptor: TransactionInterceptor<M>,
    advised: RwLock<HashMap<MethodDecl, bool>>,
}

impl<M: MetadataProvider> TransactionalProxy<M> {
    /// Wrap an interceptor; the pointcut follows its configuration
    pub fn new(interceptor: TransactionInterceptor<M>) -> Self {
        Self {
            pointcut: TransactionalPointcut::new(interceptor.config()),
            interceptor,
            advised: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped interceptor
    pub fn interceptor(&self) -> &TransactionInterceptor<M> {
        &self.interceptor
    }

    /// The matching gate
    pub fn pointcut(&self) -> &TransactionalPointcut {
        &self.pointcut
    }

    /// Whether calls to this method are intercepted
    pub fn is_advised(&self, method: &MethodDecl) -> bool {
        if let Some(&advised) = self.advised.read().get(method) {
            return advised;
        }

        let advised = self.pointcut.matches(method, self.interceptor.metadata());
        self.advised.write().insert(method.clone(), advised);
        advised
    }

    /// Number of methods with a cached match decision
    pub fn cached_decisions(&self) -> usize {
        self.advised.read().len()
    }

    /// Call `operation`, through the interceptor when the method is advised
    ///
    /// # Errors
    ///
    /// Same as [`TransactionInterceptor::intercept`]. For calls that are not
    /// advised, only `InterceptError::Operation`.
    pub fn invoke<R, T, E, F>(
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
        if self.is_advised(method) {
            self.interceptor.intercept(method, resource, operation)
        } else {
            operation(resource).map_err(InterceptError::Operation)
        }
    }
}
