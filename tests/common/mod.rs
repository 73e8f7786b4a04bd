//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::fmt;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
pub use txpolicy::{
    AnnotationRegistry, ClassDecl, Classified, InMemoryResource, InterceptError, KindRegistry,
    MethodDecl, Policy, PolicyDescriptor, PolicyOptions, ResourceOp, TransactionConfig,
    TransactionInterceptor, TransactionalProxy, TransactionalResource, Visibility,
};

// ============================================================================
// Error kinds
// ============================================================================

/// Application errors raised by the services under test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Kind `NotFound`, child of `DomainError`
    NotFound(String),
    /// Kind `Conflict`, child of `DomainError`
    Conflict,
    /// Kind `Timeout`, directly under the root
    Timeout,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Conflict => f.write_str("conflict"),
            AppError::Timeout => f.write_str("timeout"),
        }
    }
}

impl std::error::Error for AppError {}

impl Classified for AppError {
    fn error_kind(&self) -> &str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict => "Conflict",
            AppError::Timeout => "Timeout",
        }
    }
}

/// Registry with:
/// - `Error` > `DomainError` > {`NotFound`, `Conflict`}
/// - `Error` > `Timeout`
/// - `Widget` (not an error)
pub fn kinds() -> Arc<KindRegistry> {
    let mut kinds = KindRegistry::new();
    kinds
        .register_error("DomainError")
        .unwrap()
        .register("NotFound", Some("DomainError"))
        .unwrap()
        .register("Conflict", Some("DomainError"))
        .unwrap()
        .register_error("Timeout")
        .unwrap()
        .register("Widget", None)
        .unwrap();
    Arc::new(kinds)
}

// ============================================================================
// Wiring
// ============================================================================

pub fn method(class: &str, name: &str) -> MethodDecl {
    MethodDecl::new(ClassDecl::new(class), name)
}

pub fn descriptor(policy: Policy) -> PolicyDescriptor {
    PolicyDescriptor::with_policy(policy)
}

pub fn descriptor_with_no_rollback(policy: Policy, no_rollback: &[&str]) -> PolicyDescriptor {
    PolicyDescriptor::with_policy(policy)
        .with_no_rollback(no_rollback.iter().copied(), &kinds())
        .unwrap()
}

pub fn interceptor(metadata: AnnotationRegistry) -> TransactionInterceptor<AnnotationRegistry> {
    interceptor_with_config(TransactionConfig::default(), metadata)
}

pub fn interceptor_with_config(
    config: TransactionConfig,
    metadata: AnnotationRegistry,
) -> TransactionInterceptor<AnnotationRegistry> {
    TransactionInterceptor::new(Arc::new(config), kinds(), metadata).unwrap()
}

/// (begins, commits, rollbacks, resets)
pub fn counts(resource: &InMemoryResource) -> (u64, u64, u64, u64) {
    let stats = resource.stats();
    (stats.begins, stats.commits, stats.rollbacks, stats.resets)
}

// ============================================================================
// Log capture
// ============================================================================

/// In-memory sink for a `tracing-subscriber` fmt layer
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with a debug-level subscriber writing into this capture
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
