//! Pointcut and Proxy Tests
//!
//! Which calls reach the interceptor, and sharing one proxy across threads.

use std::sync::Arc;
use std::thread;

use crate::common::*;

fn account_proxy(config: TransactionConfig) -> TransactionalProxy<AnnotationRegistry> {
    let metadata = AnnotationRegistry::new()
        .annotate_class("AccountService", descriptor(Policy::Required))
        .annotate_method("ReportService", "export", descriptor(Policy::Nested));
    TransactionalProxy::new(interceptor_with_config(config, metadata))
}

fn succeed(
    proxy: &TransactionalProxy<AnnotationRegistry>,
    method: &MethodDecl,
    session: &mut InMemoryResource,
) {
    proxy
        .invoke(method, session, |_| Ok::<_, AppError>(()))
        .unwrap();
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn annotated_methods_are_advised() {
    let proxy = account_proxy(TransactionConfig::default());
    let mut session = InMemoryResource::new();

    succeed(&proxy, &method("AccountService", "deposit"), &mut session);
    succeed(&proxy, &method("ReportService", "export"), &mut session);

    assert_eq!(counts(&session), (2, 2, 0, 0));
}

#[test]
fn unannotated_method_is_not_advised() {
    let proxy = account_proxy(TransactionConfig::default());
    let mut session = InMemoryResource::new();

    succeed(&proxy, &method("ReportService", "preview"), &mut session);

    assert_eq!(counts(&session), (0, 0, 0, 0));
    // Never reached the interceptor, so no pass-through warning either
    assert_eq!(proxy.interceptor().metrics().pass_through, 0);
}

#[test]
fn non_public_methods_are_not_advised() {
    let proxy = account_proxy(TransactionConfig::default());
    for visibility in [Visibility::Protected, Visibility::Private] {
        let hidden = method("AccountService", "audit_trail").with_visibility(visibility);
        assert!(!proxy.is_advised(&hidden));
    }
}

#[test]
fn strict_mode_requires_marker() {
    let proxy = account_proxy(TransactionConfig::default().with_strict_mode(true));
    let mut session = InMemoryResource::new();

    let plain = method("AccountService", "deposit");
    let marked = MethodDecl::new(ClassDecl::new("AccountService").transactional_aware(), "deposit");

    succeed(&proxy, &plain, &mut session);
    assert_eq!(counts(&session), (0, 0, 0, 0));

    succeed(&proxy, &marked, &mut session);
    assert_eq!(counts(&session), (1, 1, 0, 0));
    assert!(proxy.pointcut().strict_mode());
}

#[test]
fn errors_of_unadvised_calls_pass_unchanged() {
    let proxy = account_proxy(TransactionConfig::default());
    let mut session = InMemoryResource::new();

    let err = proxy
        .invoke(&method("ReportService", "preview"), &mut session, |_| {
            Err::<(), _>(AppError::Timeout)
        })
        .unwrap_err();

    assert_eq!(err, InterceptError::Operation(AppError::Timeout));
    assert_eq!(session.stats(), Default::default());
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn proxy_is_shared_across_threads() {
    let proxy = Arc::new(account_proxy(TransactionConfig::default()));
    let deposit = method("AccountService", "deposit");

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let proxy = Arc::clone(&proxy);
            let deposit = deposit.clone();
            thread::spawn(move || {
                let mut session = InMemoryResource::new();
                let result = proxy.invoke(&deposit, &mut session, |_| {
                    if i % 2 == 0 {
                        Ok(i)
                    } else {
                        Err(AppError::Conflict)
                    }
                });
                (result.is_ok(), counts(&session))
            })
        })
        .collect();

    for handle in handles {
        let (ok, counts) = handle.join().unwrap();
        if ok {
            assert_eq!(counts, (1, 1, 0, 0));
        } else {
            assert_eq!(counts, (1, 0, 1, 1));
        }
    }

    let metrics = proxy.interceptor().metrics();
    assert_eq!(metrics.begun, 8);
    assert_eq!(metrics.committed, 4);
    assert_eq!(metrics.rolled_back, 4);
    assert_eq!(metrics.total_completed(), 8);
    assert_eq!(proxy.cached_decisions(), 1);
}
