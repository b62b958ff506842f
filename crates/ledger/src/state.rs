//! Fund state owned by the ledger

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use syndicate_common::{AccountId, Amount, BasisPoints, EventLog, Timestamp};

use crate::config::LedgerConfig;
use crate::events::LedgerEvent;
use crate::shares::{ClassMap, ShareClass, ShareRegistry};

/// A capital deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    /// Index in the investment list
    pub id: u64,
    /// Recipient of the deployed capital
    pub target: AccountId,
    /// Amount deployed
    pub amount: Amount,
    /// Equity received, in basis points
    pub equity_bps: BasisPoints,
    /// When the deployment was executed
    pub timestamp: Timestamp,
    /// Whether the exit has been recorded
    pub exited: bool,
    /// Amount returned on exit
    pub return_amount: Amount,
}

impl Investment {
    /// Profit on exit, floored at zero
    pub fn profit(&self) -> Amount {
        self.return_amount.saturating_sub(self.amount)
    }
}

/// Capital accounting for the fund
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundState {
    /// Sum of amounts of unexited investments
    pub total_deployed: Amount,
    /// Cumulative exit proceeds
    pub total_returns: Amount,
    /// Cumulative dividends distributed
    pub total_dividends: Amount,
    /// Cumulative dividends per share, scaled by 1e18
    pub dividends_per_share: u128,
    /// Last synchronised accumulator value per holder and class
    pub dividends_claimed: BTreeMap<AccountId, ClassMap<u128>>,
    /// Time of the last successful fee collection
    pub last_fee_collection: Timestamp,
    /// Every deployment, in id order
    pub investments: Vec<Investment>,
}

impl FundState {
    pub(crate) fn new(now: Timestamp) -> Self {
        Self {
            last_fee_collection: now,
            ..Self::default()
        }
    }

    pub(crate) fn baseline(&self, holder: &AccountId, class: ShareClass) -> u128 {
        self.dividends_claimed
            .get(holder)
            .map(|claimed| *claimed.get(class))
            .unwrap_or(0)
    }

    pub(crate) fn set_baseline(&mut self, holder: &AccountId, class: ShareClass, value: u128) {
        *self
            .dividends_claimed
            .entry(holder.clone())
            .or_default()
            .get_mut(class) = value;
    }
}

/// Everything the ledger needs to be rebuilt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub operator: AccountId,
    pub fund_account: AccountId,
    pub config: LedgerConfig,
    pub fund: FundState,
    pub shares: ClassMap<ShareRegistry>,
    #[serde(default)]
    pub events: EventLog<LedgerEvent>,
}
