//! Per-call transaction frame
//!
//! Each intercepted call owns one frame. The frame tracks whether this call
//! opened a transaction and makes sure it ends with exactly one commit or
//! rollback.
//!
//! State transitions:
//! - `Idle` → `Open` (begin)
//! - `Open` → `Committed` (flush + commit)
//! - `Open` → `RolledBack` (rollback, then reset if nothing is left active)
//!
//! Terminal states (no transitions allowed):
//! - `Committed`
//! - `RolledBack`
//!
//! A failed begin, flush, commit or rollback leaves the frame in its previous
//! state. A failed reset happens after the rollback, so the frame is already
//! `RolledBack`.

use std::fmt;

use tracing::debug;
use txpolicy_core::{ResourceError, ResourceOp, ResourceResult};

use crate::resource::TransactionalResource;

/// State of a transaction frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No transaction opened by this call
    Idle,
    /// This call opened a transaction
    Open,
    /// The transaction opened by this call was committed
    Committed,
    /// The transaction opened by this call was rolled back
    RolledBack,
}

impl FrameState {
    /// Whether no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, FrameState::Committed | FrameState::RolledBack)
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameState::Idle => "idle",
            FrameState::Open => "open",
            FrameState::Committed => "committed",
            FrameState::RolledBack => "rolled back",
        };
        f.write_str(name)
    }
}

/// How a rollback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// An outer transaction is still active on the resource
    OuterStillActive,
    /// Nothing is active any more; the session was closed and reset
    SessionReset,
}

/// Transaction bookkeeping of one intercepted call
#[derive(Debug)]
pub struct TransactionFrame {
    method: String,
    state: FrameState,
}

impl TransactionFrame {
    /// Create an idle frame for a method (used in log lines)
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            state: FrameState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Method this frame belongs to
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Begin a transaction on the resource
    ///
    /// # State Transition
    /// `Idle` → `Open`
    pub fn begin<R>(&mut self, resource: &mut R) -> ResourceResult<()>
    where
        R: TransactionalResource + ?Sized,
    {
        self.ensure_state(FrameState::Idle, ResourceOp::Begin)?;
        debug!(target: "txpolicy::tx", method = %self.method, "beginTransaction");
        resource.begin_transaction()?;
        self.state = FrameState::Open;
        Ok(())
    }

    /// Flush pending writes, then commit
    ///
    /// # State Transition
    /// `Open` → `Committed`
    pub fn commit<R>(&mut self, resource: &mut R) -> ResourceResult<()>
    where
        R: TransactionalResource + ?Sized,
    {
        self.ensure_state(FrameState::Open, ResourceOp::Commit)?;
        debug!(target: "txpolicy::tx", method = %self.method, "commit");
        resource.flush()?;
        resource.commit()?;
        self.state = FrameState::Committed;
        Ok(())
    }

    /// Roll back, then reset the session if no transaction remains active
    ///
    /// # State Transition
    /// `Open` → `RolledBack`
    pub fn rollback<R>(&mut self, resource: &mut R) -> ResourceResult<RollbackOutcome>
    where
        R: TransactionalResource + ?Sized,
    {
        self.ensure_state(FrameState::Open, ResourceOp::Rollback)?;
        debug!(target: "txpolicy::tx", method = %self.method, "rollback");
        resource.rollback()?;
        self.state = FrameState::RolledBack;

        if resource.is_transaction_active() {
            return Ok(RollbackOutcome::OuterStillActive);
        }
        debug!(target: "txpolicy::tx", method = %self.method, "closing and resetting session");
        resource.close_and_reset()?;
        Ok(RollbackOutcome::SessionReset)
    }

    fn ensure_state(&self, expected: FrameState, op: ResourceOp) -> ResourceResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ResourceError::invalid_state(op, self.state))
        }
    }
}
