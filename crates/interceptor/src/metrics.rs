//! Interceptor metrics
//!
//! The counters use Relaxed ordering: they are purely observational and do
//! not synchronize any other memory operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every call through one interceptor
#[derive(Debug, Default)]
pub struct InterceptorMetrics {
    begun: AtomicU64,
    committed: AtomicU64,
    committed_despite_failure: AtomicU64,
    rolled_back: AtomicU64,
    sessions_reset: AtomicU64,
    pass_through: AtomicU64,
}

impl InterceptorMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_begin(&self) {
        self.begun.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    /// Commit of a failed call whose error matched the no-rollback list
    pub(crate) fn record_commit_despite_failure(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
        self.committed_despite_failure
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rollback(&self, session_reset: bool) {
        self.rolled_back.fetch_add(1, Ordering::Relaxed);
        if session_reset {
            self.sessions_reset.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_pass_through(&self) {
        self.pass_through.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            begun: self.begun.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            committed_despite_failure: self.committed_despite_failure.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
            sessions_reset: self.sessions_reset.load(Ordering::Relaxed),
            pass_through: self.pass_through.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`InterceptorMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Transactions begun
    pub begun: u64,
    /// Transactions committed, including commits despite a failure
    pub committed: u64,
    /// Commits of failed calls whose error matched the no-rollback list
    pub committed_despite_failure: u64,
    /// Transactions rolled back
    pub rolled_back: u64,
    /// Sessions closed and reset after an outermost rollback
    pub sessions_reset: u64,
    /// Calls that reached the interceptor without any descriptor
    pub pass_through: u64,
}

impl MetricsSnapshot {
    /// Transactions that reached a terminal state
    pub fn total_completed(&self) -> u64 {
        self.committed + self.rolled_back
    }

    /// Rollback rate (rolled back / begun)
    pub fn rollback_rate(&self) -> f64 {
        if self.begun > 0 {
            self.rolled_back as f64 / self.begun as f64
        } else {
            0.0
        }
    }
}
