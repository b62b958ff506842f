//! Events emitted by committed ledger mutations

use serde::{Deserialize, Serialize};

use syndicate_common::{AccountId, Amount, BasisPoints};

use crate::shares::ShareClass;

/// A committed ledger mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    Deposited {
        holder: AccountId,
        class: ShareClass,
        amount: Amount,
        shares: Amount,
    },
    InvestmentExecuted {
        id: u64,
        target: AccountId,
        amount: Amount,
        equity_bps: BasisPoints,
    },
    ReturnRecorded {
        id: u64,
        return_amount: Amount,
        profit: Amount,
        carry: Amount,
    },
    ManagementFeeCollected {
        amount: Amount,
        elapsed_secs: u64,
    },
    DividendDistributed {
        amount: Amount,
        /// Increment applied to the per-share accumulator (scaled by 1e18)
        per_share: u128,
    },
    DividendsClaimed {
        holder: AccountId,
        class: ShareClass,
        amount: Amount,
    },
    Redeemed {
        holder: AccountId,
        class: ShareClass,
        shares: Amount,
        amount: Amount,
    },
    SharesTransferred {
        from: AccountId,
        to: AccountId,
        class: ShareClass,
        shares: Amount,
    },
}

impl LedgerEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Deposited { .. } => "Deposited",
            LedgerEvent::InvestmentExecuted { .. } => "InvestmentExecuted",
            LedgerEvent::ReturnRecorded { .. } => "ReturnRecorded",
            LedgerEvent::ManagementFeeCollected { .. } => "ManagementFeeCollected",
            LedgerEvent::DividendDistributed { .. } => "DividendDistributed",
            LedgerEvent::DividendsClaimed { .. } => "DividendsClaimed",
            LedgerEvent::Redeemed { .. } => "Redeemed",
            LedgerEvent::SharesTransferred { .. } => "SharesTransferred",
        }
    }
}
