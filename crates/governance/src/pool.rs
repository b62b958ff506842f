//! Capital pool seam
//!
//! Governance reads fund state and delegates investment execution through
//! this trait rather than holding the ledger's internals.

use syndicate_common::{AccountId, Amount, BasisPoints};
use syndicate_ledger::{Ledger, LedgerResult};

/// The fund as seen by governance
#[cfg_attr(test, mockall::automock)]
pub trait CapitalPool: Send + Sync {
    /// The fund operator
    fn operator(&self) -> AccountId;

    /// Available balance plus deployed capital
    fn aum(&self) -> LedgerResult<Amount>;

    /// Current Class A balance
    fn voting_power(&self, holder: &AccountId) -> LedgerResult<Amount>;

    /// Class A balance as of a registry epoch
    fn voting_power_at(&self, holder: &AccountId, epoch: u64) -> LedgerResult<Amount>;

    /// Current Class A supply
    fn voting_supply(&self) -> LedgerResult<Amount>;

    /// Class A supply as of a registry epoch
    fn voting_supply_at(&self, epoch: u64) -> LedgerResult<Amount>;

    /// Current Class A registry epoch
    fn share_epoch(&self) -> LedgerResult<u64>;

    /// Deploy capital; returns the new investment id
    fn execute_investment(
        &self,
        caller: &AccountId,
        target: &AccountId,
        amount: Amount,
        equity_bps: BasisPoints,
    ) -> LedgerResult<u64>;
}

impl CapitalPool for Ledger {
    fn operator(&self) -> AccountId {
        Ledger::operator(self).clone()
    }

    fn aum(&self) -> LedgerResult<Amount> {
        Ledger::aum(self)
    }

    fn voting_power(&self, holder: &AccountId) -> LedgerResult<Amount> {
        Ledger::voting_power(self, holder)
    }

    fn voting_power_at(&self, holder: &AccountId, epoch: u64) -> LedgerResult<Amount> {
        Ledger::voting_power_at(self, holder, epoch)
    }

    fn voting_supply(&self) -> LedgerResult<Amount> {
        Ledger::voting_supply(self)
    }

    fn voting_supply_at(&self, epoch: u64) -> LedgerResult<Amount> {
        Ledger::voting_supply_at(self, epoch)
    }

    fn share_epoch(&self) -> LedgerResult<u64> {
        Ledger::share_epoch(self)
    }

    fn execute_investment(
        &self,
        caller: &AccountId,
        target: &AccountId,
        amount: Amount,
        equity_bps: BasisPoints,
    ) -> LedgerResult<u64> {
        Ledger::execute_investment(self, caller, target, amount, equity_bps)
    }
}
