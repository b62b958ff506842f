//! A fully wired fund
//!
//! Builds the custody asset, the ledger, and governance from one
//! [`FundConfig`], and captures all three in a single serializable snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use syndicate_common::{Clock, Timestamp};
use syndicate_config::{ConfigError, FundConfig};
use syndicate_governance::{GovernanceError, GovernanceManager, GovernanceSnapshot};
use syndicate_ledger::{AssetError, AssetSnapshot, InMemoryAsset, Ledger, LedgerError, LedgerSnapshot};

/// Errors raised while assembling or persisting a fund
#[derive(Error, Debug)]
pub enum FundError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("custody error: {0}")]
    Custody(#[from] AssetError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),
}

pub type FundResult<T> = Result<T, FundError>;

/// Everything needed to rebuild a fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundSnapshot {
    pub config: FundConfig,
    pub created_at: Timestamp,
    pub custody: AssetSnapshot,
    pub ledger: LedgerSnapshot,
    pub governance: GovernanceSnapshot,
}

/// Custody asset, ledger and governance for one fund
pub struct Fund {
    config: FundConfig,
    created_at: Timestamp,
    custody: Arc<InMemoryAsset>,
    ledger: Arc<Ledger>,
    governance: Arc<GovernanceManager>,
}

impl Fund {
    /// Create an empty fund
    pub fn new(config: FundConfig, clock: Arc<dyn Clock>) -> FundResult<Self> {
        config.validate()?;
        let custody = Arc::new(InMemoryAsset::new(config.asset_symbol.clone()));
        let ledger = Arc::new(Ledger::new(
            config.operator.clone(),
            config.fund_account.clone(),
            config.ledger.clone(),
            custody.clone(),
            clock.clone(),
        )?);
        let governance = Arc::new(GovernanceManager::new(
            ledger.clone(),
            clock.clone(),
            config.governance.clone(),
        )?);
        info!("Initialised fund {} ({})", config.fund_account, config.asset_symbol);

        Ok(Self {
            created_at: clock.now(),
            config,
            custody,
            ledger,
            governance,
        })
    }

    /// Rebuild a fund from a snapshot
    pub fn restore(snapshot: FundSnapshot, clock: Arc<dyn Clock>) -> FundResult<Self> {
        snapshot.config.validate()?;
        if snapshot.ledger.operator != snapshot.config.operator
            || snapshot.ledger.fund_account != snapshot.config.fund_account
        {
            return Err(FundError::Inconsistent(
                "ledger identities do not match the fund configuration".to_string(),
            ));
        }
        if snapshot.custody.symbol != snapshot.config.asset_symbol {
            return Err(FundError::Inconsistent(format!(
                "custody asset is {}, configuration expects {}",
                snapshot.custody.symbol, snapshot.config.asset_symbol
            )));
        }

        let custody = Arc::new(InMemoryAsset::from_snapshot(snapshot.custody));
        let ledger = Arc::new(Ledger::restore(snapshot.ledger, custody.clone(), clock.clone())?);
        let governance = Arc::new(GovernanceManager::restore(
            snapshot.governance,
            ledger.clone(),
            clock,
        )?);

        Ok(Self {
            config: snapshot.config,
            created_at: snapshot.created_at,
            custody,
            ledger,
            governance,
        })
    }

    /// Capture the whole fund
    pub fn snapshot(&self) -> FundResult<FundSnapshot> {
        Ok(FundSnapshot {
            config: self.config.clone(),
            created_at: self.created_at,
            custody: self.custody.snapshot()?,
            ledger: self.ledger.snapshot()?,
            governance: self.governance.snapshot()?,
        })
    }

    /// Serialize a snapshot as pretty JSON
    pub fn to_json(&self) -> FundResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot()?)?)
    }

    /// Rebuild a fund from JSON produced by [`Fund::to_json`]
    pub fn from_json(json: &str, clock: Arc<dyn Clock>) -> FundResult<Self> {
        let snapshot: FundSnapshot = serde_json::from_str(json)?;
        Self::restore(snapshot, clock)
    }

    pub fn config(&self) -> &FundConfig {
        &self.config
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn custody(&self) -> &Arc<InMemoryAsset> {
        &self.custody
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn governance(&self) -> &Arc<GovernanceManager> {
        &self.governance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syndicate_common::{AccountId, ManualClock};
    use syndicate_ledger::ShareClass;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(1_700_000_000))
    }

    #[test]
    fn test_new_fund_is_empty() {
        let fund = Fund::new(FundConfig::new("gp"), clock()).unwrap();
        let stats = fund.ledger().fund_stats().unwrap();
        assert_eq!(stats.aum, 0);
        assert_eq!(stats.total_shares(), 0);
        assert!(fund.governance().proposals().unwrap().is_empty());
        assert_eq!(fund.created_at(), 1_700_000_000);
    }

    #[test]
    fn test_restore_rejects_mismatched_snapshot() {
        let fund = Fund::new(FundConfig::new("gp"), clock()).unwrap();
        let mut snapshot = fund.snapshot().unwrap();
        snapshot.config.operator = AccountId::from("someone-else");
        assert!(matches!(
            Fund::restore(snapshot, clock()),
            Err(FundError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_balances() {
        let clock = clock();
        let fund = Fund::new(FundConfig::new("gp"), clock.clone()).unwrap();
        let alice = AccountId::from("alice");
        fund.custody().mint(&alice, 500).unwrap();
        fund.ledger().deposit(&alice, 500, ShareClass::ClassB).unwrap();

        let restored = Fund::from_json(&fund.to_json().unwrap(), clock).unwrap();
        assert_eq!(
            restored.ledger().share_balance(&alice, ShareClass::ClassB).unwrap(),
            500
        );
        assert_eq!(restored.ledger().available_balance().unwrap(), 500);
        assert_eq!(restored.snapshot().unwrap(), fund.snapshot().unwrap());
    }
}
