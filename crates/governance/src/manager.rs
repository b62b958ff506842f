//! Governance manager
//!
//! Owns the proposal collection, accepts votes, and executes approved
//! proposals by delegating to the capital pool exactly once. Whether a vote
//! is needed at all is decided at execution time from the pool's live AUM.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use syndicate_common::{math, AccountId, Amount, Clock, EventLog, EventRecord, ReentrancyGuard, BPS_DENOMINATOR};

use crate::events::GovernanceEvent;
use crate::pool::CapitalPool;
use crate::proposals::{Proposal, ProposalRequest, ProposalState, ProposalStatus, VoteReceipt};
use crate::voting::{self, Tally};
use crate::{GovernanceConfig, GovernanceError, GovernanceResult, VoteWeighting};

/// Serializable governance state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSnapshot {
    pub config: GovernanceConfig,
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub events: EventLog<GovernanceEvent>,
}

#[derive(Debug, Default)]
struct GovernanceState {
    proposals: Vec<Proposal>,
    events: EventLog<GovernanceEvent>,
}

impl GovernanceState {
    fn proposal(&self, id: u64) -> GovernanceResult<&Proposal> {
        self.proposals
            .get(id as usize)
            .ok_or(GovernanceError::InvalidId(id))
    }

    fn proposal_mut(&mut self, id: u64) -> GovernanceResult<&mut Proposal> {
        self.proposals
            .get_mut(id as usize)
            .ok_or(GovernanceError::InvalidId(id))
    }
}

/// Proposal lifecycle and weighted voting over Class A shares
pub struct GovernanceManager {
    /// The fund being governed
    pool: Arc<dyn CapitalPool>,
    /// Time source for voting windows
    clock: Arc<dyn Clock>,
    /// Voting parameters
    config: GovernanceConfig,
    /// Held for the duration of every mutation
    guard: ReentrancyGuard,
    /// Proposals and emitted events
    state: RwLock<GovernanceState>,
}

impl std::fmt::Debug for GovernanceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GovernanceManager {
    /// Create a governance manager with no proposals
    pub fn new(
        pool: Arc<dyn CapitalPool>,
        clock: Arc<dyn Clock>,
        config: GovernanceConfig,
    ) -> GovernanceResult<Self> {
        Self::restore(
            GovernanceSnapshot {
                config,
                proposals: Vec::new(),
                events: EventLog::new(),
            },
            pool,
            clock,
        )
    }

    /// Rebuild a governance manager from a snapshot
    pub fn restore(
        snapshot: GovernanceSnapshot,
        pool: Arc<dyn CapitalPool>,
        clock: Arc<dyn Clock>,
    ) -> GovernanceResult<Self> {
        snapshot.config.validate()?;
        if let Some((index, proposal)) = snapshot
            .proposals
            .iter()
            .enumerate()
            .find(|(index, proposal)| proposal.id != *index as u64)
        {
            return Err(GovernanceError::InvalidParameter(format!(
                "proposal at position {} has id {}",
                index, proposal.id
            )));
        }

        Ok(Self {
            pool,
            clock,
            config: snapshot.config,
            guard: ReentrancyGuard::new("governance"),
            state: RwLock::new(GovernanceState {
                proposals: snapshot.proposals,
                events: snapshot.events,
            }),
        })
    }

    /// Capture the manager's full state
    pub fn snapshot(&self) -> GovernanceResult<GovernanceSnapshot> {
        let state = self.read()?;
        Ok(GovernanceSnapshot {
            config: self.config.clone(),
            proposals: state.proposals.clone(),
            events: state.events.clone(),
        })
    }

    /// Open a proposal to deploy capital (operator only)
    pub fn propose(&self, caller: &AccountId, request: ProposalRequest) -> GovernanceResult<u64> {
        let _token = self.guard.enter()?;
        self.require_operator(caller)?;

        if request.amount == 0 {
            return Err(GovernanceError::InvalidParameter(
                "proposal amount must be positive".to_string(),
            ));
        }
        if request.equity_bps == 0 || request.equity_bps as u128 > BPS_DENOMINATOR {
            return Err(GovernanceError::InvalidParameter(format!(
                "equity must be between 1 and 10000 bps, got {}",
                request.equity_bps
            )));
        }
        if request.target.is_null() {
            return Err(GovernanceError::InvalidParameter(
                "proposal target must not be empty".to_string(),
            ));
        }
        let equity_contract = match request.equity_contract {
            Some(contract) if !contract.is_null() => contract,
            _ => {
                return Err(GovernanceError::InvalidParameter(
                    "an equity contract is required".to_string(),
                ))
            }
        };

        let now = self.clock.now();
        let end_time = now
            .checked_add(self.config.voting_period_secs)
            .ok_or(math::MathError::Overflow)?;
        let snapshot_epoch = self.pool.share_epoch()?;

        let mut state = self.write()?;
        let id = state.proposals.len() as u64;
        state.proposals.push(Proposal {
            id,
            proposer: caller.clone(),
            target: request.target.clone(),
            amount: request.amount,
            equity_bps: request.equity_bps,
            description: request.description,
            equity_contract,
            start_time: now,
            end_time,
            tally: Tally::default(),
            executed: false,
            cancelled: false,
            investment_id: None,
            snapshot_epoch,
            vote_weighting: self.config.vote_weighting,
            voters: Default::default(),
        });
        self.emit(
            &mut state,
            GovernanceEvent::ProposalCreated {
                id,
                proposer: caller.clone(),
                target: request.target,
                amount: request.amount,
                end_time,
            },
        );
        Ok(id)
    }

    /// Cast a vote; returns the weight it carried
    pub fn vote(&self, caller: &AccountId, id: u64, support: bool) -> GovernanceResult<u128> {
        let _token = self.guard.enter()?;
        let now = self.clock.now();

        let (weighting, epoch) = {
            let state = self.read()?;
            let proposal = state.proposal(id)?;
            if proposal.executed {
                return Err(GovernanceError::AlreadyExecuted(id));
            }
            if proposal.cancelled {
                return Err(GovernanceError::ProposalCancelled(id));
            }
            if !proposal.is_voting_open(now) {
                return Err(GovernanceError::VotingClosed(id));
            }
            if proposal.has_voted(caller) {
                return Err(GovernanceError::AlreadyVoted {
                    id,
                    voter: caller.clone(),
                });
            }
            (proposal.vote_weighting, proposal.snapshot_epoch)
        };

        let weight = match weighting {
            VoteWeighting::Snapshot => self.pool.voting_power_at(caller, epoch)?,
            VoteWeighting::Live => self.pool.voting_power(caller)?,
        } as u128;
        if weight == 0 {
            return Err(GovernanceError::NoVotingPower(caller.clone()));
        }

        let mut state = self.write()?;
        let proposal = state.proposal_mut(id)?;
        proposal.tally.record(support, weight)?;
        proposal.voters.insert(
            caller.clone(),
            VoteReceipt {
                support,
                weight,
                timestamp: now,
            },
        );
        self.emit(
            &mut state,
            GovernanceEvent::VoteCast {
                id,
                voter: caller.clone(),
                support,
                weight,
            },
        );
        Ok(weight)
    }

    /// Execute a proposal whose voting window has closed (operator only).
    ///
    /// Amounts below the current vote threshold go through without a vote.
    /// A failed quorum or approval check leaves the proposal open for a
    /// later attempt. Returns the id of the investment created.
    pub fn execute(&self, caller: &AccountId, id: u64) -> GovernanceResult<u64> {
        let _token = self.guard.enter()?;
        self.require_operator(caller)?;
        let now = self.clock.now();

        let proposal = {
            let state = self.read()?;
            let proposal = state.proposal(id)?;
            if proposal.executed {
                return Err(GovernanceError::AlreadyExecuted(id));
            }
            if proposal.cancelled {
                return Err(GovernanceError::ProposalCancelled(id));
            }
            if now < proposal.end_time {
                return Err(GovernanceError::VotingActive {
                    id,
                    ends_at: proposal.end_time,
                });
            }
            proposal.clone()
        };

        let aum = self.pool.aum()?;
        if voting::requires_vote(proposal.amount, aum, self.config.vote_threshold_bps) {
            let supply = self.voting_supply_for(&proposal)?;
            if !proposal.tally.meets_quorum(supply, self.config.quorum_bps) {
                warn!(
                    "Proposal {} missed quorum: {} of {} eligible",
                    id,
                    proposal.tally.participation(),
                    supply
                );
                return Err(GovernanceError::QuorumNotMet {
                    id,
                    votes: proposal.tally.participation(),
                    supply,
                });
            }
            if !proposal.tally.is_approved(self.config.approval_bps) {
                warn!(
                    "Proposal {} rejected: {} for, {} against",
                    id, proposal.tally.votes_for, proposal.tally.votes_against
                );
                return Err(GovernanceError::ProposalRejected {
                    id,
                    votes_for: proposal.tally.votes_for,
                    votes_against: proposal.tally.votes_against,
                });
            }
        } else {
            debug!(
                "Proposal {} amount {} is below {} bps of AUM {}",
                id, proposal.amount, self.config.vote_threshold_bps, aum
            );
        }

        let investment_id =
            self.pool
                .execute_investment(caller, &proposal.target, proposal.amount, proposal.equity_bps)?;

        let mut state = self.write()?;
        let stored = state.proposal_mut(id)?;
        stored.executed = true;
        stored.investment_id = Some(investment_id);
        self.emit(&mut state, GovernanceEvent::ProposalExecuted { id, investment_id });
        Ok(investment_id)
    }

    /// Cancel a proposal that has not been executed (operator only)
    pub fn cancel(&self, caller: &AccountId, id: u64) -> GovernanceResult<()> {
        let _token = self.guard.enter()?;
        self.require_operator(caller)?;

        let mut state = self.write()?;
        let proposal = state.proposal_mut(id)?;
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if proposal.cancelled {
            return Err(GovernanceError::AlreadyCancelled(id));
        }
        proposal.cancelled = true;
        self.emit(&mut state, GovernanceEvent::ProposalCancelled { id });
        Ok(())
    }

    /// Live view of a proposal, recomputed from the current time and AUM
    pub fn proposal_state(&self, id: u64) -> GovernanceResult<ProposalState> {
        let now = self.clock.now();
        let proposal = self.proposal(id)?;
        let aum = self.pool.aum()?;
        let threshold = math::bps_of(aum, self.config.vote_threshold_bps)?;
        let supply = self.voting_supply_for(&proposal)?;

        let status = proposal.status(now);
        let requires_vote = voting::requires_vote(proposal.amount, aum, self.config.vote_threshold_bps);
        let passed_quorum = proposal.tally.meets_quorum(supply, self.config.quorum_bps);
        let approved = proposal.tally.is_approved(self.config.approval_bps);
        let executable =
            status == ProposalStatus::VotingClosed && (!requires_vote || (passed_quorum && approved));

        Ok(ProposalState {
            id,
            status,
            voting_active: proposal.is_voting_open(now),
            passed_quorum,
            approved,
            requires_vote,
            executable,
            votes_for: proposal.tally.votes_for,
            votes_against: proposal.tally.votes_against,
            voting_supply: supply,
            threshold,
        })
    }

    pub fn proposal(&self, id: u64) -> GovernanceResult<Proposal> {
        self.read()?.proposal(id).cloned()
    }

    pub fn proposals(&self) -> GovernanceResult<Vec<Proposal>> {
        Ok(self.read()?.proposals.clone())
    }

    pub fn has_voted(&self, id: u64, voter: &AccountId) -> GovernanceResult<bool> {
        Ok(self.read()?.proposal(id)?.has_voted(voter))
    }

    pub fn vote_receipt(&self, id: u64, voter: &AccountId) -> GovernanceResult<Option<VoteReceipt>> {
        Ok(self.read()?.proposal(id)?.voters.get(voter).cloned())
    }

    /// The vote threshold at the current AUM, rounded down for display.
    ///
    /// Decisions use [`GovernanceManager::requires_vote`], which compares
    /// without rounding.
    pub fn approval_threshold(&self) -> GovernanceResult<Amount> {
        let aum = self.pool.aum()?;
        Ok(math::bps_of(aum, self.config.vote_threshold_bps)?)
    }

    /// Whether deploying `amount` right now would need a vote
    pub fn requires_vote(&self, amount: Amount) -> GovernanceResult<bool> {
        let aum = self.pool.aum()?;
        Ok(voting::requires_vote(amount, aum, self.config.vote_threshold_bps))
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Every event emitted so far, oldest first
    pub fn events(&self) -> GovernanceResult<Vec<EventRecord<GovernanceEvent>>> {
        Ok(self.read()?.events.records().to_vec())
    }

    /// Whether a mutation is currently in flight
    pub fn is_busy(&self) -> bool {
        self.guard.is_entered()
    }

    fn voting_supply_for(&self, proposal: &Proposal) -> GovernanceResult<u128> {
        let supply = match proposal.vote_weighting {
            VoteWeighting::Snapshot => self.pool.voting_supply_at(proposal.snapshot_epoch)?,
            VoteWeighting::Live => self.pool.voting_supply()?,
        };
        Ok(supply as u128)
    }

    fn require_operator(&self, caller: &AccountId) -> GovernanceResult<()> {
        if *caller != self.pool.operator() {
            warn!("Rejected privileged governance call from {}", caller);
            return Err(GovernanceError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn emit(&self, state: &mut GovernanceState, event: GovernanceEvent) {
        info!("Governance event {}: {:?}", event.name(), event);
        state.events.push(self.clock.now(), event);
    }

    fn read(&self) -> GovernanceResult<RwLockReadGuard<'_, GovernanceState>> {
        self.state.read().map_err(|_| GovernanceError::StatePoisoned)
    }

    fn write(&self) -> GovernanceResult<RwLockWriteGuard<'_, GovernanceState>> {
        self.state.write().map_err(|_| GovernanceError::StatePoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use mockall::predicate::*;
    use syndicate_common::ManualClock;
    use syndicate_ledger::LedgerError;

    use crate::pool::MockCapitalPool;

    const START: u64 = 1_700_000_000;
    const DAY: u64 = 86_400;

    fn id(s: &str) -> AccountId {
        AccountId::from(s)
    }

    /// Pool with 1000 Class A shares split alice 600 / bob 300 / carol 100
    fn base_pool(aum: Amount) -> MockCapitalPool {
        let mut pool = MockCapitalPool::new();
        pool.expect_operator().returning(|| AccountId::from("gp"));
        pool.expect_aum().returning(move || Ok(aum));
        pool.expect_share_epoch().returning(|| Ok(3));
        pool.expect_voting_supply_at().returning(|_| Ok(1_000));
        pool.expect_voting_power_at().returning(|holder, _| {
            Ok(match holder.as_str() {
                "alice" => 600,
                "bob" => 300,
                "carol" => 100,
                _ => 0,
            })
        });
        pool
    }

    fn manager(pool: MockCapitalPool) -> (GovernanceManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let manager =
            GovernanceManager::new(Arc::new(pool), clock.clone(), GovernanceConfig::default()).unwrap();
        (manager, clock)
    }

    fn request(amount: Amount) -> ProposalRequest {
        ProposalRequest {
            target: id("startup"),
            amount,
            equity_bps: 1_000,
            description: "Seed round".to_string(),
            equity_contract: Some(id("equity-contract")),
        }
    }

    #[test]
    fn test_propose_assigns_sequential_ids() {
        let (gov, _clock) = manager(base_pool(10_000));
        assert_eq!(gov.propose(&id("gp"), request(5_000)).unwrap(), 0);
        assert_eq!(gov.propose(&id("gp"), request(6_000)).unwrap(), 1);

        let proposal = gov.proposal(1).unwrap();
        assert_eq!(proposal.start_time, START);
        assert_eq!(proposal.end_time, START + DAY);
        assert_eq!(proposal.snapshot_epoch, 3);
        assert_eq!(proposal.equity_contract, id("equity-contract"));
        assert_eq!(gov.events().unwrap().len(), 2);
    }

    #[test]
    fn test_propose_validation() {
        let (gov, _clock) = manager(base_pool(10_000));

        let mut bad = request(0);
        assert_eq!(
            gov.propose(&id("alice"), bad.clone()),
            Err(GovernanceError::Unauthorized(id("alice")))
        );
        assert!(matches!(gov.propose(&id("gp"), bad.clone()), Err(GovernanceError::InvalidParameter(_))));

        bad = request(100);
        bad.equity_bps = 0;
        assert!(matches!(gov.propose(&id("gp"), bad.clone()), Err(GovernanceError::InvalidParameter(_))));
        bad.equity_bps = 10_001;
        assert!(matches!(gov.propose(&id("gp"), bad), Err(GovernanceError::InvalidParameter(_))));

        let mut bad = request(100);
        bad.equity_contract = None;
        assert!(matches!(gov.propose(&id("gp"), bad.clone()), Err(GovernanceError::InvalidParameter(_))));
        bad.equity_contract = Some(id("  "));
        assert!(matches!(gov.propose(&id("gp"), bad), Err(GovernanceError::InvalidParameter(_))));

        let mut full_equity = request(100);
        full_equity.equity_bps = 10_000;
        assert!(gov.propose(&id("gp"), full_equity).is_ok());
        assert_eq!(gov.proposals().unwrap().len(), 1);
    }

    #[test]
    fn test_vote_weights_and_deduplication() {
        let (gov, clock) = manager(base_pool(10_000));
        let pid = gov.propose(&id("gp"), request(5_000)).unwrap();

        assert_eq!(gov.vote(&id("alice"), pid, true).unwrap(), 600);
        assert_eq!(gov.vote(&id("carol"), pid, false).unwrap(), 100);
        assert_eq!(
            gov.vote(&id("alice"), pid, false),
            Err(GovernanceError::AlreadyVoted {
                id: pid,
                voter: id("alice")
            })
        );
        assert_eq!(
            gov.vote(&id("mallory"), pid, true),
            Err(GovernanceError::NoVotingPower(id("mallory")))
        );
        assert_eq!(gov.vote(&id("bob"), 9, true), Err(GovernanceError::InvalidId(9)));

        clock.advance(DAY);
        assert_eq!(gov.vote(&id("bob"), pid, true), Err(GovernanceError::VotingClosed(pid)));

        let proposal = gov.proposal(pid).unwrap();
        assert_eq!(proposal.tally, Tally { votes_for: 600, votes_against: 100 });
        assert!(gov.has_voted(pid, &id("carol")).unwrap());
        assert!(!gov.has_voted(pid, &id("bob")).unwrap());
        assert_eq!(
            gov.vote_receipt(pid, &id("carol")).unwrap(),
            Some(VoteReceipt {
                support: false,
                weight: 100,
                timestamp: START
            })
        );
    }

    #[test]
    fn test_execute_below_threshold_needs_no_votes() {
        let mut pool = base_pool(10_000);
        pool.expect_execute_investment()
            .with(eq(id("gp")), eq(id("startup")), eq(2_999), eq(1_000))
            .times(1)
            .returning(|_, _, _, _| Ok(7));
        let (gov, clock) = manager(pool);
        let pid = gov.propose(&id("gp"), request(2_999)).unwrap();

        assert_eq!(
            gov.execute(&id("gp"), pid),
            Err(GovernanceError::VotingActive {
                id: pid,
                ends_at: START + DAY
            })
        );
        clock.advance(DAY);
        assert_eq!(gov.execute(&id("alice"), pid), Err(GovernanceError::Unauthorized(id("alice"))));
        assert_eq!(gov.execute(&id("gp"), pid).unwrap(), 7);
        assert_eq!(gov.execute(&id("gp"), pid), Err(GovernanceError::AlreadyExecuted(pid)));
        assert_eq!(gov.vote(&id("alice"), pid, true), Err(GovernanceError::AlreadyExecuted(pid)));
        assert_eq!(gov.cancel(&id("gp"), pid), Err(GovernanceError::AlreadyExecuted(pid)));

        let proposal = gov.proposal(pid).unwrap();
        assert!(proposal.executed);
        assert_eq!(proposal.investment_id, Some(7));
        assert_eq!(proposal.status(clock.now()), ProposalStatus::Executed);
    }

    #[test]
    fn test_execute_requires_quorum_then_approval() {
        let mut pool = base_pool(10_000);
        pool.expect_execute_investment().never();
        let (gov, clock) = manager(pool);

        let thin = gov.propose(&id("gp"), request(3_000)).unwrap();
        let split = gov.propose(&id("gp"), request(3_000)).unwrap();
        gov.vote(&id("carol"), thin, true).unwrap();
        gov.vote(&id("bob"), split, true).unwrap();
        gov.vote(&id("carol"), split, true).unwrap();
        gov.vote(&id("alice"), split, false).unwrap();
        clock.advance(DAY);

        assert_eq!(
            gov.execute(&id("gp"), thin),
            Err(GovernanceError::QuorumNotMet {
                id: thin,
                votes: 100,
                supply: 1_000
            })
        );
        assert_eq!(
            gov.execute(&id("gp"), split),
            Err(GovernanceError::ProposalRejected {
                id: split,
                votes_for: 400,
                votes_against: 600
            })
        );

        // rejected attempts leave the proposals retryable
        assert_eq!(gov.proposal(thin).unwrap().status(clock.now()), ProposalStatus::VotingClosed);
        assert!(!gov.proposal(split).unwrap().executed);
    }

    #[test]
    fn test_ledger_failure_leaves_proposal_open() {
        let mut pool = base_pool(10_000);
        let mut calls = 0;
        pool.expect_execute_investment().times(2).returning(move |_, _, _, _| {
            calls += 1;
            if calls == 1 {
                Err(LedgerError::InsufficientBalance {
                    needed: 5_000,
                    available: 10,
                })
            } else {
                Ok(0)
            }
        });
        let (gov, clock) = manager(pool);
        let pid = gov.propose(&id("gp"), request(5_000)).unwrap();
        gov.vote(&id("alice"), pid, true).unwrap();
        clock.advance(DAY);

        assert_eq!(
            gov.execute(&id("gp"), pid),
            Err(GovernanceError::Ledger(LedgerError::InsufficientBalance {
                needed: 5_000,
                available: 10
            }))
        );
        assert!(!gov.proposal(pid).unwrap().executed);
        assert_eq!(gov.execute(&id("gp"), pid).unwrap(), 0);
    }

    #[test]
    fn test_cancel_blocks_voting_and_execution() {
        let (gov, clock) = manager(base_pool(10_000));
        let pid = gov.propose(&id("gp"), request(5_000)).unwrap();

        assert_eq!(gov.cancel(&id("bob"), pid), Err(GovernanceError::Unauthorized(id("bob"))));
        assert_eq!(gov.cancel(&id("gp"), 4), Err(GovernanceError::InvalidId(4)));
        gov.cancel(&id("gp"), pid).unwrap();
        assert_eq!(gov.cancel(&id("gp"), pid), Err(GovernanceError::AlreadyCancelled(pid)));
        assert_eq!(gov.vote(&id("alice"), pid, true), Err(GovernanceError::ProposalCancelled(pid)));

        clock.advance(DAY);
        assert_eq!(gov.execute(&id("gp"), pid), Err(GovernanceError::ProposalCancelled(pid)));
        assert_eq!(gov.proposal_state(pid).unwrap().status, ProposalStatus::Cancelled);
    }

    #[test]
    fn test_state_tracks_live_aum() {
        let aum = Arc::new(AtomicU64::new(1_000));
        let mut pool = MockCapitalPool::new();
        pool.expect_operator().returning(|| AccountId::from("gp"));
        pool.expect_share_epoch().returning(|| Ok(0));
        pool.expect_voting_supply_at().returning(|_| Ok(1_000));
        let live = aum.clone();
        pool.expect_aum().returning(move || Ok(live.load(Ordering::SeqCst)));
        let (gov, clock) = manager(pool);
        let pid = gov.propose(&id("gp"), request(500)).unwrap();

        let state = gov.proposal_state(pid).unwrap();
        assert!(state.voting_active);
        assert!(state.requires_vote);
        assert!(!state.executable);
        assert_eq!(state.threshold, 300);

        clock.advance(DAY);
        assert!(!gov.proposal_state(pid).unwrap().executable);

        // 30% of 1_667 is 500.1, so 500 no longer needs a vote
        aum.store(1_666, Ordering::SeqCst);
        assert!(gov.proposal_state(pid).unwrap().requires_vote);
        aum.store(1_667, Ordering::SeqCst);
        let state = gov.proposal_state(pid).unwrap();
        assert_eq!(state.threshold, 500);
        assert!(!state.requires_vote);
        assert!(state.executable);

        aum.store(2_000, Ordering::SeqCst);
        let state = gov.proposal_state(pid).unwrap();
        assert!(!state.requires_vote);
        assert!(state.executable);
        assert_eq!(state.status, ProposalStatus::VotingClosed);
        assert!(!gov.requires_vote(599).unwrap());
        assert!(gov.requires_vote(600).unwrap());
    }

    #[test]
    fn test_snapshot_restore() {
        let (gov, _clock) = manager(base_pool(10_000));
        let pid = gov.propose(&id("gp"), request(5_000)).unwrap();
        gov.vote(&id("bob"), pid, true).unwrap();

        let json = serde_json::to_string(&gov.snapshot().unwrap()).unwrap();
        let snapshot: GovernanceSnapshot = serde_json::from_str(&json).unwrap();
        let restored = GovernanceManager::restore(
            snapshot,
            Arc::new(base_pool(10_000)),
            Arc::new(ManualClock::new(START)),
        )
        .unwrap();
        assert_eq!(restored.proposal(pid).unwrap(), gov.proposal(pid).unwrap());
        assert_eq!(
            restored.vote(&id("bob"), pid, false),
            Err(GovernanceError::AlreadyVoted { id: pid, voter: id("bob") })
        );
        assert_eq!(restored.events().unwrap().len(), 2);
    }
}
