//! Error types for the ledger.

use thiserror::Error;

use syndicate_common::{AccountId, Amount, GuardError, MathError};

/// Errors raised by the custody asset collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The paying account does not hold enough of the asset
    #[error("insufficient funds in {holder}: needed {needed}, available {available}")]
    InsufficientFunds {
        holder: AccountId,
        needed: Amount,
        available: Amount,
    },

    /// The account is frozen and cannot send or receive
    #[error("account is frozen: {0}")]
    Frozen(AccountId),

    /// The asset refused the operation
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// The asset could not be reached
    #[error("custody asset unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A transfer or redemption exceeds available liquidity or holdings
    #[error("insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// Zero amount, out-of-range percentage, null identity or similar
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A privileged operation was called by someone other than the operator
    #[error("unauthorized caller: {0}")]
    Unauthorized(AccountId),

    /// No investment with this id
    #[error("invalid investment id: {0}")]
    InvalidId(u64),

    /// The investment has already been exited
    #[error("investment {0} has already been exited")]
    AlreadyExited(u64),

    /// Another mutation is in flight on this ledger
    #[error(transparent)]
    Reentrancy(#[from] GuardError),

    /// Checked arithmetic failed
    #[error("arithmetic error: {0}")]
    Math(#[from] MathError),

    /// The custody asset failed the transfer or query
    #[error("custody error: {0}")]
    Custody(AssetError),

    /// A previous mutation panicked while holding the state lock
    #[error("ledger state lock poisoned")]
    StatePoisoned,
}

impl From<AssetError> for LedgerError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InsufficientFunds {
                needed, available, ..
            } => LedgerError::InsufficientBalance { needed, available },
            other => LedgerError::Custody(other),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
