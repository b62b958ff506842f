//! Governance module for Syndicate
//!
//! Large deployments of fund capital go through a proposal that Class A
//! holders vote on. This crate holds the proposal lifecycle, the weighted
//! tally rules, and the manager that executes approved proposals against
//! the ledger.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use syndicate_common::{AccountId, BasisPoints, GuardError, MathError, BPS_DENOMINATOR};
use syndicate_ledger::LedgerError;

pub mod events;
pub mod manager;
pub mod pool;
pub mod proposals;
pub mod voting;

pub use events::GovernanceEvent;
pub use manager::{GovernanceManager, GovernanceSnapshot};
pub use pool::CapitalPool;
pub use proposals::{Proposal, ProposalRequest, ProposalState, ProposalStatus, VoteReceipt};
pub use voting::Tally;

/// Error types for governance operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    /// Caller is not the fund operator
    #[error("unauthorized caller: {0}")]
    Unauthorized(AccountId),

    /// Zero amount, out-of-range equity, missing equity contract and similar
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No proposal with this id
    #[error("invalid proposal id: {0}")]
    InvalidId(u64),

    /// The voter already voted on this proposal
    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { id: u64, voter: AccountId },

    /// The voting window is not open
    #[error("voting is closed for proposal {0}")]
    VotingClosed(u64),

    /// The voting window has not ended yet
    #[error("voting on proposal {id} is still active until {ends_at}")]
    VotingActive { id: u64, ends_at: u64 },

    /// The proposal has already been executed
    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(u64),

    /// The proposal has already been cancelled
    #[error("proposal {0} has already been cancelled")]
    AlreadyCancelled(u64),

    /// The proposal was cancelled and cannot be voted on or executed
    #[error("proposal {0} has been cancelled")]
    ProposalCancelled(u64),

    /// The voter holds no Class A shares
    #[error("{0} has no voting power")]
    NoVotingPower(AccountId),

    /// Too little of the voting supply participated
    #[error("quorum not met on proposal {id}: {votes} votes of {supply} eligible")]
    QuorumNotMet { id: u64, votes: u128, supply: u128 },

    /// Participation was sufficient but approval was not
    #[error("proposal {id} rejected: {votes_for} for, {votes_against} against")]
    ProposalRejected {
        id: u64,
        votes_for: u128,
        votes_against: u128,
    },

    /// The ledger refused a query or the delegated investment
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Another governance mutation is in flight
    #[error(transparent)]
    Reentrancy(#[from] GuardError),

    /// Checked arithmetic failed
    #[error("arithmetic error: {0}")]
    Math(#[from] MathError),

    /// A previous mutation panicked while holding the state lock
    #[error("governance state lock poisoned")]
    StatePoisoned,
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// How a voter's weight is determined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteWeighting {
    /// Class A balance as of the proposal's creation; quorum is measured
    /// against the supply at that point
    #[default]
    Snapshot,
    /// Class A balance at the moment the vote is cast; quorum is measured
    /// against the current supply
    Live,
}

/// Configuration for governance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Length of the voting window in seconds
    #[serde(default = "default_voting_period")]
    pub voting_period_secs: u64,

    /// Minimum participation, in basis points of the voting supply
    #[serde(default = "default_quorum_bps")]
    pub quorum_bps: BasisPoints,

    /// Minimum share of cast weight voting in favour, in basis points
    #[serde(default = "default_approval_bps")]
    pub approval_bps: BasisPoints,

    /// Deployments at or above this share of AUM need a vote, in basis points
    #[serde(default = "default_vote_threshold_bps")]
    pub vote_threshold_bps: BasisPoints,

    /// Balance source for vote weight and quorum
    #[serde(default)]
    pub vote_weighting: VoteWeighting,
}

fn default_voting_period() -> u64 {
    24 * 60 * 60
}

fn default_quorum_bps() -> BasisPoints {
    3_000
}

fn default_approval_bps() -> BasisPoints {
    5_100
}

fn default_vote_threshold_bps() -> BasisPoints {
    3_000
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            voting_period_secs: default_voting_period(),
            quorum_bps: default_quorum_bps(),
            approval_bps: default_approval_bps(),
            vote_threshold_bps: default_vote_threshold_bps(),
            vote_weighting: VoteWeighting::default(),
        }
    }
}

impl GovernanceConfig {
    /// Reject out-of-range settings
    pub fn validate(&self) -> GovernanceResult<()> {
        if self.voting_period_secs == 0 {
            return Err(GovernanceError::InvalidParameter(
                "voting_period_secs must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("quorum_bps", self.quorum_bps),
            ("approval_bps", self.approval_bps),
            ("vote_threshold_bps", self.vote_threshold_bps),
        ] {
            if value as u128 > BPS_DENOMINATOR {
                return Err(GovernanceError::InvalidParameter(format!(
                    "{} must be at most 10000, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GovernanceConfig::default();
        assert_eq!(config.voting_period_secs, 86_400);
        assert_eq!(config.quorum_bps, 3_000);
        assert_eq!(config.approval_bps, 5_100);
        assert_eq!(config.vote_threshold_bps, 3_000);
        assert_eq!(config.vote_weighting, VoteWeighting::Snapshot);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: GovernanceConfig =
            serde_json::from_str(r#"{"vote_weighting": "live", "quorum_bps": 2500}"#).unwrap();
        assert_eq!(config.vote_weighting, VoteWeighting::Live);
        assert_eq!(config.quorum_bps, 2_500);
        assert_eq!(config.approval_bps, 5_100);
    }

    #[test]
    fn test_invalid_config() {
        let config = GovernanceConfig {
            approval_bps: 10_001,
            ..GovernanceConfig::default()
        };
        assert!(matches!(config.validate(), Err(GovernanceError::InvalidParameter(_))));
    }

    #[test]
    fn test_ledger_errors_convert() {
        let err: GovernanceError = LedgerError::InvalidId(3).into();
        assert_eq!(err, GovernanceError::Ledger(LedgerError::InvalidId(3)));
    }
}
