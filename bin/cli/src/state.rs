//! The fund state file
//!
//! Each invocation loads the whole fund from JSON, runs one command, and
//! writes the fund back when the command changed it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::fs;
use tracing::debug;

use syndicate::Fund;
use syndicate_common::Clock;
use syndicate_config::FundConfig;

/// A fund persisted as a JSON snapshot
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Create an empty fund and write it out
    pub async fn create(&self, config: FundConfig, clock: Arc<dyn Clock>, force: bool) -> Result<Fund> {
        if !force && self.exists().await {
            return Err(anyhow!(
                "state file {} already exists (use --force to overwrite)",
                self.path.display()
            ));
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let fund = Fund::new(config, clock)?;
        self.save(&fund).await?;
        Ok(fund)
    }

    /// The `log_level` recorded in the state file's configuration, if the
    /// file can be read
    pub async fn configured_log_level(&self) -> Option<String> {
        let json = fs::read_to_string(&self.path).await.ok()?;
        let value: serde_json::Value = serde_json::from_str(&json).ok()?;
        value
            .pointer("/config/log_level")
            .and_then(|level| level.as_str())
            .map(str::to_string)
    }

    pub async fn load(&self, clock: Arc<dyn Clock>) -> Result<Fund> {
        let json = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {} (run `syndicate init` first)", self.path.display()))?;
        let fund = Fund::from_json(&json, clock)?;
        debug!("Loaded fund state from {}", self.path.display());
        Ok(fund)
    }

    /// Write through a temporary file so a failed write keeps the old state
    pub async fn save(&self, fund: &Fund) -> Result<()> {
        let json = fund.to_json()?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!("Saved fund state to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syndicate_common::{AccountId, ManualClock};

    #[tokio::test]
    async fn test_create_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("nested").join("fund.json"));
        let clock = Arc::new(ManualClock::new(1_000));
        assert!(!file.exists().await);

        let fund = file.create(FundConfig::new("gp"), clock.clone(), false).await.unwrap();
        fund.custody().mint(&AccountId::from("alice"), 10).unwrap();
        file.save(&fund).await.unwrap();

        let loaded = file.load(clock.clone()).await.unwrap();
        assert_eq!(loaded.snapshot().unwrap(), fund.snapshot().unwrap());
        assert!(file.create(FundConfig::new("gp"), clock.clone(), false).await.is_err());
        assert!(file.create(FundConfig::new("gp"), clock, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("missing.json"));
        assert!(file.load(Arc::new(ManualClock::new(0))).await.is_err());
        assert_eq!(file.configured_log_level().await, None);
    }

    #[tokio::test]
    async fn test_configured_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("fund.json"));
        let mut config = FundConfig::new("gp");
        config.log_level = "syndicate_ledger=debug,warn".to_string();
        file.create(config, Arc::new(ManualClock::new(0)), false).await.unwrap();
        assert_eq!(
            file.configured_log_level().await.as_deref(),
            Some("syndicate_ledger=debug,warn")
        );
    }
}
