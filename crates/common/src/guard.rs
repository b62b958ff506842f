//! Reentrancy guard
//!
//! Every mutating entry point that calls out to an external collaborator
//! holds the guard for its whole duration. A callback that tries to start a
//! second mutation on the same instance, from the same thread or any other,
//! is refused instead of blocking.

use std::sync::{Mutex, MutexGuard, TryLockError};

use thiserror::Error;
use tracing::warn;

/// Errors raised by the guard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// A mutation is already in flight on this instance
    #[error("reentrant call rejected: {0} is already executing a mutation")]
    Reentered(&'static str),
}

/// Per-instance mutual exclusion for state-changing operations
#[derive(Debug)]
pub struct ReentrancyGuard {
    /// Name of the owning component, for diagnostics
    owner: &'static str,
    lock: Mutex<()>,
}

/// Proof that the guard is held; released on drop
#[derive(Debug)]
pub struct ReentrancyToken<'a> {
    _held: MutexGuard<'a, ()>,
}

impl ReentrancyGuard {
    /// Create a guard for the named component
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            lock: Mutex::new(()),
        }
    }

    /// Enter the guarded section
    pub fn enter(&self) -> Result<ReentrancyToken<'_>, GuardError> {
        match self.lock.try_lock() {
            Ok(held) => Ok(ReentrancyToken { _held: held }),
            // A panicked mutation never committed, so the section is free again.
            Err(TryLockError::Poisoned(poisoned)) => Ok(ReentrancyToken {
                _held: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => {
                warn!("Rejected reentrant call into {}", self.owner);
                Err(GuardError::Reentered(self.owner))
            }
        }
    }

    /// Whether a mutation is currently in flight
    pub fn is_entered(&self) -> bool {
        matches!(self.lock.try_lock(), Err(TryLockError::WouldBlock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_entry_is_rejected() {
        let guard = ReentrancyGuard::new("ledger");
        let token = guard.enter().unwrap();
        assert!(guard.is_entered());
        assert_eq!(guard.enter().unwrap_err(), GuardError::Reentered("ledger"));
        drop(token);
        assert!(!guard.is_entered());
        assert!(guard.enter().is_ok());
    }
}
