//! Core Interception Scenarios
//!
//! - Required call that succeeds commits once
//! - Required call that fails rolls back and re-raises
//! - No-rollback error commits and still re-raises
//! - No descriptor passes through untouched
//! - Policy truth table

use crate::common::*;
use txpolicy::{resolve, CoreError, Resolution};

fn user_service(descriptor: PolicyDescriptor) -> TransactionInterceptor<AnnotationRegistry> {
    interceptor(AnnotationRegistry::new().annotate_method("UserService", "save", descriptor))
}

// ============================================================================
// Success / failure paths
// ============================================================================

#[test]
fn required_success_begins_and_commits_once() {
    let interceptor = user_service(descriptor(Policy::Required));
    let mut session = InMemoryResource::new();

    let id = interceptor
        .intercept(&method("UserService", "save"), &mut session, |_| {
            Ok::<_, AppError>(17)
        })
        .unwrap();

    assert_eq!(id, 17);
    assert_eq!(counts(&session), (1, 1, 0, 0));
    assert_eq!(session.stats().flushes, 1);
    assert!(!session.is_transaction_active());
}

#[test]
fn required_failure_rolls_back_and_reraises() {
    let interceptor = user_service(descriptor(Policy::Required));
    let mut session = InMemoryResource::new();

    let err = interceptor
        .intercept(&method("UserService", "save"), &mut session, |_| {
            Err::<(), _>(AppError::Timeout)
        })
        .unwrap_err();

    assert_eq!(err, InterceptError::Operation(AppError::Timeout));
    assert_eq!(counts(&session), (1, 0, 1, 1));
    assert_eq!(session.generation(), 1);
}

#[test]
fn no_rollback_error_commits_and_reraises() {
    let interceptor =
        user_service(descriptor_with_no_rollback(Policy::Required, &["NotFound"]));
    let mut session = InMemoryResource::new();

    let err = interceptor
        .intercept(&method("UserService", "save"), &mut session, |_| {
            Err::<(), _>(AppError::NotFound("user 7".into()))
        })
        .unwrap_err();

    assert_eq!(
        err.into_operation(),
        Some(AppError::NotFound("user 7".into()))
    );
    assert_eq!(counts(&session), (1, 1, 0, 0));
    assert_eq!(session.stats().flushes, 1);
}

#[test]
fn missing_descriptor_passes_result_and_error_through() {
    let interceptor = interceptor(AnnotationRegistry::new());
    let mut session = InMemoryResource::new();
    let save = method("UserService", "save");

    let value = interceptor
        .intercept(&save, &mut session, |_| Ok::<_, AppError>("ok"))
        .unwrap();
    assert_eq!(value, "ok");

    let err = interceptor
        .intercept(&save, &mut session, |_| Err::<(), _>(AppError::Conflict))
        .unwrap_err();
    assert_eq!(err, InterceptError::Operation(AppError::Conflict));

    assert_eq!(counts(&session), (0, 0, 0, 0));
    assert_eq!(interceptor.metrics().pass_through, 2);
}

#[test]
fn not_required_outside_transaction_makes_no_resource_calls() {
    let interceptor = user_service(descriptor(Policy::NotRequired));
    let mut session = InMemoryResource::new();

    interceptor
        .intercept(&method("UserService", "save"), &mut session, |r| {
            assert!(!r.is_transaction_active());
            Ok::<_, AppError>(())
        })
        .unwrap();

    assert_eq!(session.stats(), Default::default());
}

// ============================================================================
// Descriptor precedence
// ============================================================================

#[test]
fn method_descriptor_wins_over_class_descriptor() {
    let metadata = AnnotationRegistry::new()
        .annotate_class("UserService", descriptor(Policy::NotRequired))
        .annotate_method("UserService", "save", descriptor(Policy::Required));
    let interceptor = interceptor(metadata);
    let mut session = InMemoryResource::new();

    interceptor
        .intercept(&method("UserService", "save"), &mut session, |_| {
            Ok::<_, AppError>(())
        })
        .unwrap();
    interceptor
        .intercept(&method("UserService", "find"), &mut session, |_| {
            Ok::<_, AppError>(())
        })
        .unwrap();

    // Only `save` began a transaction
    assert_eq!(counts(&session), (1, 1, 0, 0));
}

#[test]
fn unset_policy_uses_configured_default() {
    let metadata = AnnotationRegistry::new().annotate_method(
        "UserService",
        "save",
        PolicyDescriptor::unset(),
    );
    let interceptor = interceptor_with_config(
        TransactionConfig::default().with_default_policy(Policy::NotRequired),
        metadata,
    );
    let mut session = InMemoryResource::new();

    interceptor
        .intercept(&method("UserService", "save"), &mut session, |_| {
            Ok::<_, AppError>(())
        })
        .unwrap();

    assert_eq!(counts(&session), (0, 0, 0, 0));
}

// ============================================================================
// Truth table
// ============================================================================

#[test]
fn transaction_required_truth_table() {
    let config = TransactionConfig::default();
    let cases = [
        (Policy::NotRequired, false, false),
        (Policy::NotRequired, true, false),
        (Policy::Required, false, true),
        (Policy::Required, true, false),
        (Policy::Nested, false, true),
        (Policy::Nested, true, true),
    ];

    for (policy, active, expected) in cases {
        let descriptor = descriptor(policy);
        let resolution = resolve(Some(&descriptor), &config, active);
        assert!(matches!(resolution, Resolution::Transactional(_)));
        assert_eq!(
            resolution.transaction_required(),
            expected,
            "{:?} with active={}",
            policy,
            active
        );
    }
    assert!(!resolve(None, &config, false).transaction_required());
}

#[test]
fn out_of_range_policy_code_is_rejected() {
    for code in [0, 4, -1, 99] {
        let err = PolicyDescriptor::new(PolicyOptions::new().policy(code), &kinds()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPolicy { .. }), "code {}", code);
    }
}

#[test]
fn descriptor_keeps_no_rollback_entries_as_a_set() {
    let options = PolicyOptions::new()
        .policy(3)
        .no_rollback_exceptions(["NotFound", "Timeout", "NotFound"]);
    let descriptor = PolicyDescriptor::new(options, &kinds()).unwrap();

    assert_eq!(descriptor.policy(), Some(Policy::Nested));
    let entries: Vec<&str> = descriptor
        .no_rollback_exceptions()
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(entries, vec!["NotFound", "Timeout"]);
}
