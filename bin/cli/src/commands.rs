//! Command handlers
//!
//! Every handler returns the text to print so the binary stays a thin
//! shell around [`run`].

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};
use tracing::info;

use syndicate::Fund;
use syndicate_common::{AccountId, Clock, ManualClock, SystemClock, Timestamp};
use syndicate_config::{level_for_verbosity, FundConfig};
use syndicate_governance::{Proposal, ProposalRequest};
use syndicate_ledger::{scaled_to_decimal, CustodyAsset, ShareClass};

use crate::cli::{Cli, Commands};
use crate::state::StateFile;

/// Run one parsed invocation against its state file
pub async fn run(cli: Cli) -> Result<String> {
    let clock: Arc<dyn Clock> = match cli.at {
        Some(at) => Arc::new(ManualClock::new(at)),
        None => Arc::new(SystemClock),
    };
    let file = StateFile::new(&cli.state);

    if let Commands::Init { config, force } = &cli.command {
        let config = match config {
            Some(path) => FundConfig::from_file(path)?,
            None => FundConfig::from_env()?,
        };
        let fund = file.create(config, clock, *force).await?;
        return Ok(format!(
            "Initialised fund {} ({}) operated by {} at {}",
            fund.config().fund_account,
            fund.config().asset_symbol,
            fund.config().operator,
            file.path().display()
        ));
    }

    let fund = file.load(clock).await?;
    let output = execute(&fund, &cli.command)?;
    if cli.command.mutates() {
        file.save(&fund).await?;
    }
    Ok(output)
}

/// Log level for an invocation: `-v` flags win, then the fund's configured
/// `log_level`, then `warn`
pub async fn log_level(cli: &Cli) -> String {
    if cli.verbose > 0 {
        return level_for_verbosity(cli.verbose).to_string();
    }
    let configured = match &cli.command {
        Commands::Init { config: Some(path), .. } => FundConfig::from_file(path).ok().map(|c| c.log_level),
        Commands::Init { config: None, .. } => FundConfig::from_env().ok().map(|c| c.log_level),
        _ => StateFile::new(&cli.state).configured_log_level().await,
    };
    configured.unwrap_or_else(|| level_for_verbosity(0).to_string())
}

/// Apply one command to a loaded fund
pub fn execute(fund: &Fund, command: &Commands) -> Result<String> {
    let ledger = fund.ledger();
    let governance = fund.governance();

    let output = match command {
        Commands::Init { .. } => return Err(anyhow!("init does not run against a loaded fund")),
        Commands::Faucet { account, amount } => {
            let account = AccountId::from(account.as_str());
            fund.custody().mint(&account, *amount)?;
            info!("Faucet credited {} {} to {}", amount, fund.config().asset_symbol, account);
            format!(
                "Credited {} {} to {} (balance {})",
                amount,
                fund.config().asset_symbol,
                account,
                fund.custody().balance_of(&account)?
            )
        }
        Commands::Deposit { caller, amount, class } => {
            let shares = ledger.deposit(&caller.as_str().into(), *amount, *class)?;
            format!("Deposited {} for {} Class {} shares", amount, shares, class)
        }
        Commands::Redeem { caller, shares, class } => {
            let payout = ledger.redeem(&caller.as_str().into(), *shares, *class)?;
            format!("Redeemed {} Class {} shares for {}", shares, class, payout)
        }
        Commands::TransferShares { caller, to, shares, class } => {
            ledger.transfer_shares(&caller.as_str().into(), &to.as_str().into(), *shares, *class)?;
            format!("Transferred {} Class {} shares from {} to {}", shares, class, caller, to)
        }
        Commands::Invest { caller, target, amount, equity_bps } => {
            if governance.requires_vote(*amount)? {
                return Err(anyhow!(
                    "deploying {} needs a Class A vote (threshold {}); use `syndicate propose`",
                    amount,
                    governance.approval_threshold()?
                ));
            }
            let id = ledger.execute_investment(&caller.as_str().into(), &target.as_str().into(), *amount, *equity_bps)?;
            format!("Investment {} deployed {} to {}", id, amount, target)
        }
        Commands::RecordReturn { caller, id, amount } => {
            let carry = ledger.record_return(&caller.as_str().into(), *id, *amount)?;
            format!("Recorded return of {} on investment {} (carry {})", amount, id, carry)
        }
        Commands::Distribute { caller, amount } => {
            let per_share = ledger.distribute_dividends(&caller.as_str().into(), *amount)?;
            format!("Distributed {} ({} per share)", amount, format_scaled(per_share))
        }
        Commands::Claim { caller, class } => {
            let claimed = ledger.claim_dividends(&caller.as_str().into(), *class)?;
            format!("Claimed {} in Class {} dividends", claimed, class)
        }
        Commands::CollectFee { caller } => match ledger.collect_management_fee(&caller.as_str().into())? {
            0 => "No management fee due".to_string(),
            fee => format!("Collected management fee of {}", fee),
        },
        Commands::Propose {
            caller,
            target,
            amount,
            equity_bps,
            description,
            equity_contract,
        } => {
            let request = ProposalRequest {
                target: target.as_str().into(),
                amount: *amount,
                equity_bps: *equity_bps,
                description: description.clone(),
                equity_contract: Some(equity_contract.as_str().into()),
            };
            let id = governance.propose(&caller.as_str().into(), request)?;
            let proposal = governance.proposal(id)?;
            format!("Proposal {} open for voting until {}", id, format_time(proposal.end_time))
        }
        Commands::Vote { caller, id, against } => {
            let weight = governance.vote(&caller.as_str().into(), *id, !*against)?;
            let side = if *against { "against" } else { "for" };
            format!("{} voted {} proposal {} with weight {}", caller, side, id, weight)
        }
        Commands::Execute { caller, id } => {
            let investment = governance.execute(&caller.as_str().into(), *id)?;
            format!("Proposal {} executed as investment {}", id, investment)
        }
        Commands::Cancel { caller, id } => {
            governance.cancel(&caller.as_str().into(), *id)?;
            format!("Proposal {} cancelled", id)
        }
        Commands::Status { account } => status(fund, account.as_deref())?,
        Commands::Proposal { id: Some(id) } => describe_proposal(fund, &governance.proposal(*id)?)?,
        Commands::Proposal { id: None } => {
            let proposals = governance.proposals()?;
            if proposals.is_empty() {
                "No proposals".to_string()
            } else {
                let mut out = Vec::new();
                for proposal in &proposals {
                    out.push(describe_proposal(fund, proposal)?);
                }
                out.join("\n\n")
            }
        }
        Commands::Investments {} => {
            let investments = ledger.investments()?;
            if investments.is_empty() {
                "No investments".to_string()
            } else {
                investments
                    .iter()
                    .map(|inv| {
                        let state = if inv.exited {
                            format!("exited, returned {}", inv.return_amount)
                        } else {
                            "active".to_string()
                        };
                        format!(
                            "#{} {} amount {} equity {} bps at {} ({})",
                            inv.id,
                            inv.target,
                            inv.amount,
                            inv.equity_bps,
                            format_time(inv.timestamp),
                            state
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Commands::Events { json } => events(fund, *json)?,
    };
    Ok(output)
}

fn status(fund: &Fund, account: Option<&str>) -> Result<String> {
    let ledger = fund.ledger();
    let governance = fund.governance();
    let stats = ledger.fund_stats()?;
    let nav = stats
        .nav_decimal()
        .map(|nav| nav.to_string())
        .unwrap_or_else(|| format_scaled(stats.nav_per_share));

    let mut out = String::new();
    writeln!(
        out,
        "Fund {} ({}) operated by {}, created {}",
        fund.config().fund_account,
        fund.config().asset_symbol,
        fund.config().operator,
        format_time(fund.created_at())
    )?;
    writeln!(out, "AUM:                {}", stats.aum)?;
    writeln!(out, "Available:          {}", stats.available_balance)?;
    writeln!(out, "Deployed:           {}", stats.total_deployed)?;
    writeln!(out, "Total returns:      {}", stats.total_returns)?;
    writeln!(out, "Total dividends:    {}", stats.total_dividends)?;
    writeln!(out, "Class A supply:     {}", stats.class_a_supply)?;
    writeln!(out, "Class B supply:     {}", stats.class_b_supply)?;
    writeln!(out, "NAV per share:      {}", nav)?;
    writeln!(out, "Investments:        {}", stats.investment_count)?;
    writeln!(out, "Accrued fee:        {}", ledger.accrued_management_fee()?)?;
    write!(out, "Vote threshold:     {}", governance.approval_threshold()?)?;

    if let Some(account) = account {
        let holder = AccountId::from(account);
        write!(
            out,
            "\n\n{}\n  {} balance: {}\n  Voting power: {}",
            holder,
            fund.config().asset_symbol,
            fund.custody().balance_of(&holder)?,
            ledger.voting_power(&holder)?
        )?;
        for class in ShareClass::ALL {
            write!(
                out,
                "\n  Class {}: {} shares, {} pending dividends",
                class,
                ledger.share_balance(&holder, class)?,
                ledger.pending_dividends(&holder, class)?
            )?;
        }
    }
    Ok(out)
}

fn describe_proposal(fund: &Fund, proposal: &Proposal) -> Result<String> {
    let state = fund.governance().proposal_state(proposal.id)?;
    let mut out = String::new();
    writeln!(out, "Proposal {} [{:?}] by {}", proposal.id, state.status, proposal.proposer)?;
    if !proposal.description.is_empty() {
        writeln!(out, "  {}", proposal.description)?;
    }
    writeln!(
        out,
        "  {} to {} for {} bps",
        proposal.amount, proposal.target, proposal.equity_bps
    )?;
    writeln!(
        out,
        "  Voting {} to {}",
        format_time(proposal.start_time),
        format_time(proposal.end_time)
    )?;
    writeln!(
        out,
        "  For {} / against {} of {} (quorum {}, approved {})",
        state.votes_for, state.votes_against, state.voting_supply, state.passed_quorum, state.approved
    )?;
    write!(
        out,
        "  Threshold {} (vote required {}), executable {}",
        state.threshold, state.requires_vote, state.executable
    )?;
    if let Some(investment) = proposal.investment_id {
        write!(out, "\n  Investment {}", investment)?;
    }
    Ok(out)
}

fn events(fund: &Fund, json: bool) -> Result<String> {
    let mut lines = Vec::new();
    for record in fund.ledger().events()? {
        lines.push(if json {
            serde_json::to_string(&record)?
        } else {
            format!(
                "ledger     #{:<4} {} {}",
                record.sequence,
                format_time(record.timestamp),
                record.event.name()
            )
        });
    }
    for record in fund.governance().events()? {
        lines.push(if json {
            serde_json::to_string(&record)?
        } else {
            format!(
                "governance #{:<4} {} {}",
                record.sequence,
                format_time(record.timestamp),
                record.event.name()
            )
        });
    }
    if lines.is_empty() {
        return Ok("No events".to_string());
    }
    Ok(lines.join("\n"))
}

fn format_time(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|time| time.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

fn format_scaled(value: u128) -> String {
    scaled_to_decimal(value)
        .map(|d| d.to_string())
        .unwrap_or_else(|| format!("{}e-18", value))
}
