//! Logging Tests
//!
//! The pass-through warning and the debug trail of a transactional call.

use crate::common::*;

#[test]
fn missing_descriptor_logs_a_warning() {
    let capture = LogCapture::new();
    let interceptor = interceptor(AnnotationRegistry::new());
    let mut session = InMemoryResource::new();

    capture.run(|| {
        interceptor
            .intercept(&method("UserService", "save"), &mut session, |_| {
                Ok::<_, AppError>(())
            })
            .unwrap();
    });

    let warnings = capture.lines_containing("WARN");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("no descriptor was found for the method"));
    assert!(warnings[0].contains("UserService::save"));
}

#[test]
fn transactional_call_logs_no_warning() {
    let capture = LogCapture::new();
    let interceptor = interceptor(
        AnnotationRegistry::new().annotate_class("UserService", descriptor(Policy::Required)),
    );
    let mut session = InMemoryResource::new();

    capture.run(|| {
        interceptor
            .intercept(&method("UserService", "save"), &mut session, |_| {
                Err::<(), _>(AppError::Conflict)
            })
            .unwrap_err();
    });

    assert!(capture.lines_containing("WARN").is_empty());
    assert!(!capture.lines_containing("beginTransaction").is_empty());
    assert!(!capture.lines_containing("rollback").is_empty());
    assert!(!capture.lines_containing("closing and resetting session").is_empty());
}

#[test]
fn pointcut_match_logs_policy_and_defaults() {
    let capture = LogCapture::new();
    let metadata = AnnotationRegistry::new()
        .annotate_method("ReportService", "export", descriptor(Policy::Nested))
        .annotate_method("ReportService", "rebuild", PolicyDescriptor::unset());
    let proxy = TransactionalProxy::new(interceptor(metadata));

    capture.run(|| {
        assert!(proxy.is_advised(&method("ReportService", "export")));
        assert!(proxy.is_advised(&method("ReportService", "rebuild")));
    });

    let policies = capture.lines_containing("TX policy");
    assert_eq!(policies.len(), 2);
    assert!(policies[0].contains("nested"));
    assert!(policies[1].contains("default"));

    let no_rollback = capture.lines_containing("TX no-rollback exceptions");
    assert_eq!(no_rollback.len(), 2);
    assert!(no_rollback.iter().all(|line| line.contains("no_rollback=default")));
}
