//! Custody asset seam
//!
//! The fungible asset the fund holds is an external ledger. The fund only
//! needs to pull deposits in, push payouts out, and read balances; any of
//! those may fail, and a failure aborts the enclosing ledger operation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use syndicate_common::{AccountId, Amount};

use crate::error::AssetError;

/// The external fungible asset held in custody by the fund
#[cfg_attr(test, mockall::automock)]
pub trait CustodyAsset: Send + Sync {
    /// Move `amount` from `payer` to `to` on the payer's behalf
    fn transfer_from(&self, payer: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError>;

    /// Move `amount` out of `from` (an account the caller controls) to `to`
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError>;

    /// Current balance of `holder`
    fn balance_of(&self, holder: &AccountId) -> Result<Amount, AssetError>;
}

/// Callback invoked after a completed transfer, modelling recipient code
/// that runs when it receives the asset
pub trait TransferHook: Send + Sync {
    /// Called once the balances have moved
    fn on_transfer(&self, from: &AccountId, to: &AccountId, amount: Amount);
}

/// Serializable state of an [`InMemoryAsset`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    /// Ticker of the asset
    pub symbol: String,
    /// Balances by holder
    pub balances: BTreeMap<AccountId, Amount>,
    /// Accounts that can neither send nor receive
    #[serde(default)]
    pub frozen: BTreeSet<AccountId>,
}

/// In-process custody asset
pub struct InMemoryAsset {
    symbol: String,
    balances: RwLock<BTreeMap<AccountId, Amount>>,
    frozen: RwLock<BTreeSet<AccountId>>,
    hook: RwLock<Option<Arc<dyn TransferHook>>>,
}

impl InMemoryAsset {
    /// Create an empty asset
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::from_snapshot(AssetSnapshot {
            symbol: symbol.into(),
            ..AssetSnapshot::default()
        })
    }

    /// Rebuild an asset from a snapshot
    pub fn from_snapshot(snapshot: AssetSnapshot) -> Self {
        Self {
            symbol: snapshot.symbol,
            balances: RwLock::new(snapshot.balances),
            frozen: RwLock::new(snapshot.frozen),
            hook: RwLock::new(None),
        }
    }

    /// Ticker of the asset
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Credit `amount` to `to` out of thin air (faucet)
    pub fn mint(&self, to: &AccountId, amount: Amount) -> Result<(), AssetError> {
        let mut balances = self.balances.write().map_err(|_| poisoned())?;
        let balance = balances.entry(to.clone()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| AssetError::Rejected(format!("balance overflow for {}", to)))?;
        debug!("Minted {} {} to {}", amount, self.symbol, to);
        Ok(())
    }

    /// Freeze or unfreeze an account
    pub fn set_frozen(&self, account: &AccountId, frozen: bool) -> Result<(), AssetError> {
        let mut set = self.frozen.write().map_err(|_| poisoned())?;
        if frozen {
            set.insert(account.clone());
        } else {
            set.remove(account);
        }
        Ok(())
    }

    /// Install the callback run after each transfer
    pub fn set_hook(&self, hook: Option<Arc<dyn TransferHook>>) -> Result<(), AssetError> {
        *self.hook.write().map_err(|_| poisoned())? = hook;
        Ok(())
    }

    /// Capture the current balances
    pub fn snapshot(&self) -> Result<AssetSnapshot, AssetError> {
        Ok(AssetSnapshot {
            symbol: self.symbol.clone(),
            balances: self.balances.read().map_err(|_| poisoned())?.clone(),
            frozen: self.frozen.read().map_err(|_| poisoned())?.clone(),
        })
    }

    fn move_balance(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError> {
        {
            let frozen = self.frozen.read().map_err(|_| poisoned())?;
            if let Some(account) = [from, to].into_iter().find(|a| frozen.contains(*a)) {
                return Err(AssetError::Frozen(account.clone()));
            }
        }

        {
            let mut balances = self.balances.write().map_err(|_| poisoned())?;
            let available = balances.get(from).copied().unwrap_or(0);
            if available < amount {
                return Err(AssetError::InsufficientFunds {
                    holder: from.clone(),
                    needed: amount,
                    available,
                });
            }
            let receiving = balances.get(to).copied().unwrap_or(0);
            if from != to {
                let credited = receiving
                    .checked_add(amount)
                    .ok_or_else(|| AssetError::Rejected(format!("balance overflow for {}", to)))?;
                balances.insert(from.clone(), available - amount);
                balances.insert(to.clone(), credited);
            }
        }

        debug!("Transferred {} {} from {} to {}", amount, self.symbol, from, to);

        // Balances are committed and unlocked before recipient code runs.
        let hook = self.hook.read().map_err(|_| poisoned())?.clone();
        if let Some(hook) = hook {
            hook.on_transfer(from, to, amount);
        }
        Ok(())
    }
}

impl CustodyAsset for InMemoryAsset {
    fn transfer_from(&self, payer: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError> {
        self.move_balance(payer, to, amount)
    }

    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError> {
        self.move_balance(from, to, amount)
    }

    fn balance_of(&self, holder: &AccountId) -> Result<Amount, AssetError> {
        let balances = self.balances.read().map_err(|_| poisoned())?;
        Ok(balances.get(holder).copied().unwrap_or(0))
    }
}

fn poisoned() -> AssetError {
    AssetError::Unavailable("asset state lock poisoned".to_string())
}
