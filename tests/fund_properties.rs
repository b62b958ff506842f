//! End-to-end behaviour of a wired fund

use std::sync::Arc;

use syndicate::common::{AccountId, ManualClock, SCALE};
use syndicate::config::FundConfig;
use syndicate::governance::{GovernanceError, ProposalRequest};
use syndicate::ledger::{CustodyAsset, ShareClass};
use syndicate::Fund;

const START: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

fn id(s: &str) -> AccountId {
    AccountId::from(s)
}

fn fund() -> (Fund, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START));
    let fund = Fund::new(FundConfig::new("gp"), clock.clone()).unwrap();
    for who in ["alice", "bob", "carol"] {
        fund.custody().mint(&id(who), 1_000_000).unwrap();
    }
    (fund, clock)
}

fn deal(amount: u64) -> ProposalRequest {
    ProposalRequest {
        target: id("startup"),
        amount,
        equity_bps: 1_000,
        description: "Growth round".to_string(),
        equity_contract: Some(id("equity-contract")),
    }
}

#[test]
fn nav_stays_at_par_while_only_deposits_happen() {
    let (fund, _clock) = fund();
    let ledger = fund.ledger();
    assert_eq!(ledger.nav_per_share().unwrap(), SCALE);
    for (who, amount, class) in [
        ("alice", 1_000, ShareClass::ClassA),
        ("bob", 333, ShareClass::ClassB),
        ("carol", 77_777, ShareClass::ClassA),
        ("alice", 1, ShareClass::ClassB),
    ] {
        ledger.deposit(&id(who), amount, class).unwrap();
        assert_eq!(ledger.nav_per_share().unwrap(), SCALE);
    }
}

#[test]
fn deposits_after_deployment_price_on_aum() {
    let (fund, _clock) = fund();
    let ledger = fund.ledger();
    ledger.deposit(&id("alice"), 1_000, ShareClass::ClassA).unwrap();
    ledger.execute_investment(&id("gp"), &id("startup"), 900, 500).unwrap();

    assert_eq!(ledger.deposit(&id("bob"), 1_000, ShareClass::ClassA).unwrap(), 1_000);
    assert_eq!(ledger.fund_stats().unwrap().total_shares(), 2_000);
}

#[test]
fn exit_releases_original_amount_and_pays_carry() {
    let (fund, _clock) = fund();
    let ledger = fund.ledger();
    let gp = id("gp");
    ledger.deposit(&id("alice"), 1_000, ShareClass::ClassA).unwrap();
    let winner = ledger.execute_investment(&gp, &id("winner"), 500, 500).unwrap();
    let loser = ledger.execute_investment(&gp, &id("loser"), 500, 500).unwrap();

    fund.custody().mint(&fund.config().fund_account, 1_150).unwrap();
    assert_eq!(ledger.record_return(&gp, winner, 750).unwrap(), 50);
    assert_eq!(ledger.total_deployed().unwrap(), 500);
    assert_eq!(ledger.record_return(&gp, loser, 400).unwrap(), 0);
    assert_eq!(ledger.total_deployed().unwrap(), 0);
    assert_eq!(fund.custody().balance_of(&gp).unwrap(), 50);
}

#[test]
fn dividend_classes_are_independent() {
    let (fund, _clock) = fund();
    let ledger = fund.ledger();
    let alice = id("alice");
    ledger.deposit(&alice, 3_000, ShareClass::ClassA).unwrap();
    ledger.deposit(&alice, 1_000, ShareClass::ClassB).unwrap();
    ledger.distribute_dividends(&id("gp"), 400).unwrap();

    assert_eq!(ledger.claim_dividends(&alice, ShareClass::ClassB).unwrap(), 100);
    assert_eq!(ledger.pending_dividends(&alice, ShareClass::ClassA).unwrap(), 300);
    assert_eq!(ledger.pending_dividends(&alice, ShareClass::ClassB).unwrap(), 0);
}

#[test]
fn redeem_all_and_redeposit_forfeits_nothing_twice() {
    let (fund, _clock) = fund();
    let ledger = fund.ledger();
    let alice = id("alice");
    ledger.deposit(&alice, 1_000, ShareClass::ClassB).unwrap();
    ledger.deposit(&id("bob"), 1_000, ShareClass::ClassA).unwrap();
    ledger.distribute_dividends(&id("gp"), 500).unwrap();
    assert_eq!(ledger.claim_dividends(&alice, ShareClass::ClassB).unwrap(), 250);

    let held = ledger.share_balance(&alice, ShareClass::ClassB).unwrap();
    ledger.redeem(&alice, held, ShareClass::ClassB).unwrap();
    ledger.deposit(&alice, 1_000, ShareClass::ClassB).unwrap();
    assert_eq!(ledger.pending_dividends(&alice, ShareClass::ClassB).unwrap(), 0);
}

#[test]
fn governance_threshold_follows_aum() {
    let (fund, clock) = fund();
    let ledger = fund.ledger();
    let governance = fund.governance();
    ledger.deposit(&id("alice"), 10_000, ShareClass::ClassA).unwrap();

    let amount = 6_000;
    let pid = governance.propose(&id("gp"), deal(amount)).unwrap();
    clock.advance(DAY);
    assert!(governance.requires_vote(amount).unwrap());
    assert!(matches!(
        governance.execute(&id("gp"), pid),
        Err(GovernanceError::QuorumNotMet { .. })
    ));

    // amount / 0.30 = 20_000: still a vote at exactly that AUM, none past it
    ledger.deposit(&id("bob"), 10_000, ShareClass::ClassB).unwrap();
    assert!(governance.requires_vote(amount).unwrap());
    ledger.deposit(&id("carol"), 1, ShareClass::ClassB).unwrap();
    assert_eq!(ledger.aum().unwrap(), 20_001);
    assert!(!governance.requires_vote(amount).unwrap());
    assert!(governance.proposal_state(pid).unwrap().executable);

    let investment = governance.execute(&id("gp"), pid).unwrap();
    assert_eq!(ledger.investment(investment).unwrap().amount, amount);
}

#[test]
fn threshold_compares_without_rounding() {
    let (fund, _clock) = fund();
    let ledger = fund.ledger();
    let governance = fund.governance();
    ledger.deposit(&id("alice"), 1_001, ShareClass::ClassA).unwrap();

    // 30% of 1_001 is 300.3
    assert_eq!(governance.approval_threshold().unwrap(), 300);
    assert!(!governance.requires_vote(300).unwrap());
    assert!(governance.requires_vote(301).unwrap());
}

#[test]
fn quorum_and_approval_boundaries() {
    let (fund, clock) = fund();
    let ledger = fund.ledger();
    let governance = fund.governance();
    let gp = id("gp");
    fund.custody().mint(&id("dave"), 1_000).unwrap();

    // 10_000 Class A shares
    for (who, amount) in [("alice", 3_000), ("bob", 2_000), ("carol", 4_900), ("dave", 100)] {
        ledger.deposit(&id(who), amount, ShareClass::ClassA).unwrap();
    }

    let exact_quorum = governance.propose(&gp, deal(5_000)).unwrap();
    let exact_approval = governance.propose(&gp, deal(5_000)).unwrap();
    ledger.transfer_shares(&id("dave"), &id("carol"), 1, ShareClass::ClassA).unwrap();
    let under_approval = governance.propose(&gp, deal(5_000)).unwrap();
    ledger.transfer_shares(&id("alice"), &id("erin"), 1, ShareClass::ClassA).unwrap();
    let under_quorum = governance.propose(&gp, deal(5_000)).unwrap();

    // 3_000 of 10_000
    governance.vote(&id("alice"), exact_quorum, true).unwrap();
    // 5_100 for, 4_900 against
    for pid in [exact_approval, under_approval] {
        for voter in ["alice", "bob", "dave"] {
            governance.vote(&id(voter), pid, true).unwrap();
        }
        governance.vote(&id("carol"), pid, false).unwrap();
    }
    // 2_999 of 10_000
    governance.vote(&id("alice"), under_quorum, true).unwrap();

    clock.advance(DAY);

    let state = governance.proposal_state(exact_quorum).unwrap();
    assert!(state.passed_quorum && state.approved && state.executable);
    let state = governance.proposal_state(exact_approval).unwrap();
    assert_eq!((state.votes_for, state.votes_against), (5_100, 4_900));
    assert!(state.approved);
    let state = governance.proposal_state(under_approval).unwrap();
    assert_eq!((state.votes_for, state.votes_against), (5_099, 4_901));
    assert!(state.passed_quorum && !state.approved);
    let state = governance.proposal_state(under_quorum).unwrap();
    assert_eq!(state.votes_for, 2_999);
    assert!(!state.passed_quorum);

    assert!(matches!(
        governance.execute(&gp, under_approval),
        Err(GovernanceError::ProposalRejected { .. })
    ));
    assert!(matches!(
        governance.execute(&gp, under_quorum),
        Err(GovernanceError::QuorumNotMet { .. })
    ));
    governance.execute(&gp, exact_quorum).unwrap();
    governance.execute(&gp, exact_approval).unwrap();
    assert_eq!(ledger.total_deployed().unwrap(), 10_000);
}
