//! Proposal model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use syndicate_common::{AccountId, Amount, BasisPoints, Timestamp};

use crate::voting::Tally;
use crate::VoteWeighting;

/// Parameters for a new deployment proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    /// Recipient of the capital
    pub target: AccountId,
    /// Amount to deploy
    pub amount: Amount,
    /// Equity received, in basis points
    pub equity_bps: BasisPoints,
    /// Free-form description of the deal
    pub description: String,
    /// Contract enforcing the deal's payout to the fund
    pub equity_contract: Option<AccountId>,
}

/// A recorded vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    /// `true` for, `false` against
    pub support: bool,
    /// Weight the vote carried
    pub weight: u128,
    /// When the vote was cast
    pub timestamp: Timestamp,
}

/// A proposal to deploy fund capital
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Sequential identifier
    pub id: u64,
    /// Operator that created the proposal
    pub proposer: AccountId,
    /// Recipient of the capital
    pub target: AccountId,
    /// Amount to deploy
    pub amount: Amount,
    /// Equity received, in basis points
    pub equity_bps: BasisPoints,
    /// Free-form description
    pub description: String,
    /// Contract enforcing the deal's payout
    pub equity_contract: AccountId,
    /// Start of the voting window
    pub start_time: Timestamp,
    /// End of the voting window (exclusive)
    pub end_time: Timestamp,
    /// Weight cast for and against
    pub tally: Tally,
    /// Whether the proposal has been executed
    pub executed: bool,
    /// Whether the proposal has been cancelled
    pub cancelled: bool,
    /// Investment created on execution
    pub investment_id: Option<u64>,
    /// Share registry epoch captured at creation
    pub snapshot_epoch: u64,
    /// Weighting in force when the proposal was created
    pub vote_weighting: VoteWeighting,
    /// Everyone who has voted, with their receipt
    pub voters: BTreeMap<AccountId, VoteReceipt>,
}

impl Proposal {
    /// Lifecycle status at time `now`
    pub fn status(&self, now: Timestamp) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if self.cancelled {
            ProposalStatus::Cancelled
        } else if now < self.end_time {
            ProposalStatus::Voting
        } else {
            ProposalStatus::VotingClosed
        }
    }

    /// Whether votes are accepted at time `now`
    pub fn is_voting_open(&self, now: Timestamp) -> bool {
        !self.executed && !self.cancelled && now >= self.start_time && now < self.end_time
    }

    pub fn has_voted(&self, voter: &AccountId) -> bool {
        self.voters.contains_key(voter)
    }
}

/// Lifecycle of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Within the voting window
    Voting,
    /// Window over, awaiting execution
    VotingClosed,
    /// Executed against the ledger
    Executed,
    /// Cancelled by the operator
    Cancelled,
}

/// Live view of a proposal, recomputed from the current time and AUM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalState {
    pub id: u64,
    pub status: ProposalStatus,
    /// Votes are currently accepted
    pub voting_active: bool,
    /// Participation meets quorum
    pub passed_quorum: bool,
    /// Cast weight meets the approval bar
    pub approved: bool,
    /// The amount is at or above the current vote threshold
    pub requires_vote: bool,
    /// An execute call right now would pass the governance checks
    pub executable: bool,
    pub votes_for: u128,
    pub votes_against: u128,
    /// Voting supply quorum is measured against
    pub voting_supply: u128,
    /// Current vote threshold
    pub threshold: Amount,
}
