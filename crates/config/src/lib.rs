use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use syndicate_common::AccountId;
use syndicate_governance::GovernanceConfig;
use syndicate_ledger::LedgerConfig;

/// Errors that can occur in configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("Failed to read file: {0}")]
    FileReadError(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration for one fund
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundConfig {
    /// The privileged operator (GP)
    pub operator: AccountId,
    /// Account that holds the fund's custody balance
    #[serde(default = "default_fund_account")]
    pub fund_account: AccountId,
    /// Symbol of the custody asset
    #[serde(default = "default_asset_symbol")]
    pub asset_symbol: String,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub governance: GovernanceConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_fund_account() -> AccountId {
    AccountId::from("fund")
}

fn default_asset_symbol() -> String {
    "USDC".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl FundConfig {
    /// Configuration with defaults for everything except the operator
    pub fn new(operator: impl Into<AccountId>) -> Self {
        Self {
            operator: operator.into(),
            fund_account: default_fund_account(),
            asset_symbol: default_asset_symbol(),
            ledger: LedgerConfig::default(),
            governance: GovernanceConfig::default(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which plays the role of the
    /// process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SYNDICATE_CONFIG_FILE") {
            debug!("Loading configuration from {}", path);
            return Self::from_file(&path);
        }

        let operator = lookup("SYNDICATE_OPERATOR")
            .ok_or_else(|| ConfigError::EnvVarNotFound("SYNDICATE_OPERATOR".to_string()))?;

        let mut config = Self::new(operator);
        if let Some(fund_account) = lookup("SYNDICATE_FUND_ACCOUNT") {
            config.fund_account = AccountId::from(fund_account);
        }
        if let Some(symbol) = lookup("SYNDICATE_ASSET_SYMBOL") {
            config.asset_symbol = symbol;
        }
        if let Some(value) = parse_var(&lookup, "SYNDICATE_CARRY_BPS")? {
            config.ledger.carry_bps = value;
        }
        if let Some(value) = parse_var(&lookup, "SYNDICATE_MANAGEMENT_FEE_BPS")? {
            config.ledger.management_fee_bps = value;
        }
        if let Some(value) = parse_var(&lookup, "SYNDICATE_VOTING_PERIOD_SECS")? {
            config.governance.voting_period_secs = value;
        }
        if let Some(level) = lookup("SYNDICATE_LOG_LEVEL") {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileReadError(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: FundConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check identities, fee and voting parameters, and the log level
    pub fn validate(&self) -> Result<()> {
        if self.operator.is_null() {
            return Err(ConfigError::Invalid("operator must not be empty".to_string()));
        }
        if self.fund_account.is_null() {
            return Err(ConfigError::Invalid("fund_account must not be empty".to_string()));
        }
        if self.operator == self.fund_account {
            return Err(ConfigError::Invalid(
                "operator and fund_account must differ".to_string(),
            ));
        }
        self.ledger
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.governance
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_log_level(&self.log_level)
    }
}

/// Accept a bare level (`info`) or a full filter directive (`syndicate=debug,warn`)
fn validate_log_level(level: &str) -> Result<()> {
    let parsed = if level.contains('=') || level.contains(',') {
        EnvFilter::try_new(level).map(|_| ()).map_err(|e| e.to_string())
    } else {
        level.parse::<LevelFilter>().map(|_| ()).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| ConfigError::Invalid(format!("log_level {}: {}", level, e)))
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}

/// Map a `-v` count onto a log level
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use syndicate_governance::VoteWeighting;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_env_defaults() {
        let config = FundConfig::from_lookup(lookup(&[("SYNDICATE_OPERATOR", "gp")])).unwrap();
        assert_eq!(config.operator, AccountId::from("gp"));
        assert_eq!(config.fund_account, AccountId::from("fund"));
        assert_eq!(config.asset_symbol, "USDC");
        assert_eq!(config.ledger, LedgerConfig::default());
        assert_eq!(config.governance, GovernanceConfig::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let config = FundConfig::from_lookup(lookup(&[
            ("SYNDICATE_OPERATOR", "gp"),
            ("SYNDICATE_FUND_ACCOUNT", "vault"),
            ("SYNDICATE_CARRY_BPS", "1500"),
            ("SYNDICATE_MANAGEMENT_FEE_BPS", " 100 "),
            ("SYNDICATE_VOTING_PERIOD_SECS", "3600"),
            ("SYNDICATE_LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.fund_account, AccountId::from("vault"));
        assert_eq!(config.ledger.carry_bps, 1_500);
        assert_eq!(config.ledger.management_fee_bps, 100);
        assert_eq!(config.governance.voting_period_secs, 3_600);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_env_errors() {
        assert!(matches!(
            FundConfig::from_lookup(lookup(&[])),
            Err(ConfigError::EnvVarNotFound(_))
        ));
        assert!(matches!(
            FundConfig::from_lookup(lookup(&[
                ("SYNDICATE_OPERATOR", "gp"),
                ("SYNDICATE_CARRY_BPS", "lots")
            ])),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "SYNDICATE_CARRY_BPS"
        ));
        assert!(matches!(
            FundConfig::from_lookup(lookup(&[
                ("SYNDICATE_OPERATOR", "gp"),
                ("SYNDICATE_CARRY_BPS", "20000")
            ])),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "operator: gp\nledger:\n  carry_bps: 1000\ngovernance:\n  vote_weighting: live\n  quorum_bps: 4000\n"
        )
        .unwrap();

        let config = FundConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ledger.carry_bps, 1_000);
        assert_eq!(config.ledger.management_fee_bps, 200);
        assert_eq!(config.governance.vote_weighting, VoteWeighting::Live);
        assert_eq!(config.governance.quorum_bps, 4_000);
        assert_eq!(config.governance.approval_bps, 5_100);

        let path = file.path().to_string_lossy().to_string();
        let from_env = FundConfig::from_lookup(lookup(&[("SYNDICATE_CONFIG_FILE", path.as_str())])).unwrap();
        assert_eq!(from_env, config);
    }

    #[test]
    fn test_yaml_round_trip_and_validation() {
        let config = FundConfig::new("gp");
        let yaml = config.to_yaml().unwrap();
        let parsed: FundConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);

        let mut bad = FundConfig::new("fund");
        assert!(matches!(bad.validate(), Err(ConfigError::Invalid(_))));
        bad.operator = AccountId::from("gp");
        bad.log_level = "loud".to_string();
        assert!(bad.validate().is_err());
        bad.log_level = "syndicate_ledger=debug,warn".to_string();
        assert!(bad.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            FundConfig::from_file("/nonexistent/syndicate.yaml"),
            Err(ConfigError::FileReadError(_))
        ));
    }

    #[test]
    fn test_missing_config_file_from_env_is_an_error() {
        let result = FundConfig::from_lookup(lookup(&[
            ("SYNDICATE_CONFIG_FILE", "/nonexistent/syndicate.yaml"),
            ("SYNDICATE_OPERATOR", "gp"),
        ]));
        assert!(matches!(result, Err(ConfigError::FileReadError(_))));
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(9), "trace");
    }
}
