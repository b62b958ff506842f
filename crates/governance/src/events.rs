//! Events emitted by governance

use serde::{Deserialize, Serialize};

use syndicate_common::{AccountId, Amount, Timestamp};

/// A committed governance change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GovernanceEvent {
    ProposalCreated {
        id: u64,
        proposer: AccountId,
        target: AccountId,
        amount: Amount,
        end_time: Timestamp,
    },
    VoteCast {
        id: u64,
        voter: AccountId,
        support: bool,
        weight: u128,
    },
    ProposalExecuted {
        id: u64,
        investment_id: u64,
    },
    ProposalCancelled {
        id: u64,
    },
}

impl GovernanceEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            GovernanceEvent::ProposalCreated { .. } => "ProposalCreated",
            GovernanceEvent::VoteCast { .. } => "VoteCast",
            GovernanceEvent::ProposalExecuted { .. } => "ProposalExecuted",
            GovernanceEvent::ProposalCancelled { .. } => "ProposalCancelled",
        }
    }
}
