//! Transactional resources
//!
//! The interceptor never talks to a database directly. It drives a
//! [`TransactionalResource`], the session object of one unit of work, and
//! leaves nesting, savepoints and actual persistence to it.

use txpolicy_core::{ResourceError, ResourceOp, ResourceResult};

/// Capability set the interceptor needs from a session
///
/// One resource per unit of work; it is passed by `&mut` and never shared
/// across concurrent calls.
pub trait TransactionalResource {
    /// Whether a transaction is currently open on this session
    fn is_transaction_active(&self) -> bool;

    /// Begin a transaction, or increase the nesting level if one is open
    fn begin_transaction(&mut self) -> ResourceResult<()>;

    /// Push pending writes before a commit
    ///
    /// The interceptor always calls this right before [`commit`](Self::commit).
    fn flush(&mut self) -> ResourceResult<()> {
        Ok(())
    }

    /// Commit the innermost transaction
    fn commit(&mut self) -> ResourceResult<()>;

    /// Roll back the innermost transaction
    fn rollback(&mut self) -> ResourceResult<()>;

    /// Invalidate the session and prepare a fresh one
    ///
    /// Called only after a rollback that leaves no transaction active.
    fn close_and_reset(&mut self) -> ResourceResult<()>;
}

impl<R: TransactionalResource + ?Sized> TransactionalResource for &mut R {
    fn is_transaction_active(&self) -> bool {
        (**self).is_transaction_active()
    }

    fn begin_transaction(&mut self) -> ResourceResult<()> {
        (**self).begin_transaction()
    }

    fn flush(&mut self) -> ResourceResult<()> {
        (**self).flush()
    }

    fn commit(&mut self) -> ResourceResult<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> ResourceResult<()> {
        (**self).rollback()
    }

    fn close_and_reset(&mut self) -> ResourceResult<()> {
        (**self).close_and_reset()
    }
}

/// Call counters of an [`InMemoryResource`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    /// Successful begin calls
    pub begins: u64,
    /// Successful flush calls
    pub flushes: u64,
    /// Successful commit calls
    pub commits: u64,
    /// Successful rollback calls
    pub rollbacks: u64,
    /// Successful close-and-reset calls
    pub resets: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Injection {
    Once,
    Always,
}

/// Session with a nesting-level transaction counter
///
/// Begin increments the level, commit and rollback decrement it; a
/// transaction is active while the level is above zero. `close_and_reset`
/// opens a new session generation. Failures can be injected per operation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResource {
    level: u32,
    generation: u64,
    stats: ResourceStats,
    failures: Vec<(ResourceOp, Injection)>,
}

impl InMemoryResource {
    /// Create a fresh session with no transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting level
    pub fn nesting_level(&self) -> u32 {
        self.level
    }

    /// Number of times the session was reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Call counters
    pub fn stats(&self) -> ResourceStats {
        self.stats
    }

    /// Make the next call of `op` fail
    pub fn fail_once(&mut self, op: ResourceOp) -> &mut Self {
        self.failures.push((op, Injection::Once));
        self
    }

    /// Make every call of `op` fail
    pub fn fail_always(&mut self, op: ResourceOp) -> &mut Self {
        self.failures.push((op, Injection::Always));
        self
    }

    /// Remove all injected failures
    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    fn check_injected(&mut self, op: ResourceOp) -> ResourceResult<()> {
        let Some(pos) = self.failures.iter().position(|(o, _)| *o == op) else {
            return Ok(());
        };
        if self.failures[pos].1 == Injection::Once {
            self.failures.remove(pos);
        }
        Err(ResourceError::failed(op, "injected failure"))
    }

    fn require_active(&self, op: ResourceOp) -> ResourceResult<()> {
        if self.level == 0 {
            return Err(ResourceError::invalid_state(op, "no active transaction"));
        }
        Ok(())
    }
}

impl TransactionalResource for InMemoryResource {
    fn is_transaction_active(&self) -> bool {
        self.level > 0
    }

    fn begin_transaction(&mut self) -> ResourceResult<()> {
        self.check_injected(ResourceOp::Begin)?;
        self.level += 1;
        self.stats.begins += 1;
        Ok(())
    }

    fn flush(&mut self) -> ResourceResult<()> {
        self.check_injected(ResourceOp::Flush)?;
        self.stats.flushes += 1;
        Ok(())
    }

    fn commit(&mut self) -> ResourceResult<()> {
        self.require_active(ResourceOp::Commit)?;
        self.check_injected(ResourceOp::Commit)?;
        self.level -= 1;
        self.stats.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> ResourceResult<()> {
        self.require_active(ResourceOp::Rollback)?;
        self.check_injected(ResourceOp::Rollback)?;
        self.level -= 1;
        self.stats.rollbacks += 1;
        Ok(())
    }

    fn close_and_reset(&mut self) -> ResourceResult<()> {
        self.check_injected(ResourceOp::Reset)?;
        self.level = 0;
        self.generation += 1;
        self.stats.resets += 1;
        Ok(())
    }
}
