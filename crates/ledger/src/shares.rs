//! Share classes and the per-class share registry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use syndicate_common::{math, AccountId, Amount};

use crate::error::{LedgerError, LedgerResult};

/// The two tiers of fund ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShareClass {
    /// Voting shares
    ClassA,
    /// Non-voting shares
    ClassB,
}

impl ShareClass {
    /// Both classes, in registry order
    pub const ALL: [ShareClass; 2] = [ShareClass::ClassA, ShareClass::ClassB];

    /// Whether holders of this class vote on proposals
    pub fn is_voting(&self) -> bool {
        matches!(self, ShareClass::ClassA)
    }
}

impl fmt::Display for ShareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareClass::ClassA => write!(f, "A"),
            ShareClass::ClassB => write!(f, "B"),
        }
    }
}

impl FromStr for ShareClass {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "class-a" | "classa" => Ok(ShareClass::ClassA),
            "b" | "class-b" | "classb" => Ok(ShareClass::ClassB),
            other => Err(LedgerError::InvalidParameter(format!("unknown share class: {}", other))),
        }
    }
}

/// A value kept once per share class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMap<T> {
    pub class_a: T,
    pub class_b: T,
}

impl<T> ClassMap<T> {
    pub fn new(class_a: T, class_b: T) -> Self {
        Self { class_a, class_b }
    }

    pub fn get(&self, class: ShareClass) -> &T {
        match class {
            ShareClass::ClassA => &self.class_a,
            ShareClass::ClassB => &self.class_b,
        }
    }

    pub fn get_mut(&mut self, class: ShareClass) -> &mut T {
        match class {
            ShareClass::ClassA => &mut self.class_a,
            ShareClass::ClassB => &mut self.class_b,
        }
    }
}

/// A recorded value as of a registry epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Epoch at which the value took effect
    pub epoch: u64,
    /// The value from that epoch onwards
    pub value: Amount,
}

/// Fungible balance ledger for one share class.
///
/// Every mint, burn or transfer advances the registry epoch. A voting
/// registry also writes a checkpoint for each balance it touches, so
/// historical balances can be read back with [`ShareRegistry::balance_at`];
/// a non-voting registry keeps no history. Supply changes are only
/// reachable from inside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRegistry {
    class: ShareClass,
    balances: BTreeMap<AccountId, Amount>,
    total_supply: Amount,
    epoch: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    balance_checkpoints: BTreeMap<AccountId, Vec<Checkpoint>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    supply_checkpoints: Vec<Checkpoint>,
}

impl ShareRegistry {
    /// Create an empty registry
    pub fn new(class: ShareClass) -> Self {
        Self {
            class,
            balances: BTreeMap::new(),
            total_supply: 0,
            epoch: 0,
            balance_checkpoints: BTreeMap::new(),
            supply_checkpoints: Vec::new(),
        }
    }

    /// The class this registry tracks
    pub fn class(&self) -> ShareClass {
        self.class
    }

    /// Current balance of `holder`
    pub fn balance_of(&self, holder: &AccountId) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Current total supply
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Number of mutations applied so far
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Balance of `holder` as of `epoch`; the current balance for a
    /// non-voting registry
    pub fn balance_at(&self, holder: &AccountId, epoch: u64) -> Amount {
        if !self.class.is_voting() {
            return self.balance_of(holder);
        }
        self.balance_checkpoints
            .get(holder)
            .map(|checkpoints| value_at(checkpoints, epoch))
            .unwrap_or(0)
    }

    /// Total supply as of `epoch`; the current supply for a non-voting
    /// registry
    pub fn total_supply_at(&self, epoch: u64) -> Amount {
        if !self.class.is_voting() {
            return self.total_supply;
        }
        value_at(&self.supply_checkpoints, epoch)
    }

    /// Holders with a non-zero balance
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, Amount)> {
        self.balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(holder, balance)| (holder, *balance))
    }

    /// Check that minting `amount` to `to` cannot overflow
    pub(crate) fn check_mint(&self, to: &AccountId, amount: Amount) -> LedgerResult<()> {
        math::add(self.total_supply, amount)?;
        math::add(self.balance_of(to), amount)?;
        Ok(())
    }

    pub(crate) fn mint(&mut self, to: &AccountId, amount: Amount) -> LedgerResult<()> {
        self.check_mint(to, amount)?;
        self.epoch += 1;
        self.total_supply += amount;
        let balance = self.balance_of(to) + amount;
        self.set_balance(to, balance);
        self.record_supply();
        Ok(())
    }

    pub(crate) fn burn(&mut self, from: &AccountId, amount: Amount) -> LedgerResult<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: balance,
            });
        }
        self.epoch += 1;
        self.total_supply -= amount;
        self.set_balance(from, balance - amount);
        self.record_supply();
        Ok(())
    }

    pub(crate) fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> LedgerResult<()> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: from_balance,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = math::add(self.balance_of(to), amount)?;
        self.epoch += 1;
        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance);
        Ok(())
    }

    fn record_supply(&mut self) {
        if self.class.is_voting() {
            self.supply_checkpoints.push(Checkpoint {
                epoch: self.epoch,
                value: self.total_supply,
            });
        }
    }

    fn set_balance(&mut self, holder: &AccountId, balance: Amount) {
        self.balances.insert(holder.clone(), balance);
        if !self.class.is_voting() {
            return;
        }
        self.balance_checkpoints
            .entry(holder.clone())
            .or_default()
            .push(Checkpoint {
                epoch: self.epoch,
                value: balance,
            });
    }
}

fn value_at(checkpoints: &[Checkpoint], epoch: u64) -> Amount {
    let idx = checkpoints.partition_point(|c| c.epoch <= epoch);
    if idx == 0 {
        0
    } else {
        checkpoints[idx - 1].value
    }
}
