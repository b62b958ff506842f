//! The fund ledger
//!
//! Owns the fund's capital accounting and both share registries. Every
//! mutation runs inside the ledger's reentrancy guard and follows the same
//! shape: validate and compute against a read view, perform at most one
//! custody interaction, then commit under the write lock. A custody failure
//! therefore leaves the ledger untouched.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use syndicate_common::{
    math, AccountId, Amount, BasisPoints, Clock, EventLog, EventRecord, ReentrancyGuard, BPS_DENOMINATOR,
    SCALE,
};

use crate::asset::CustodyAsset;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::events::LedgerEvent;
use crate::shares::{ClassMap, ShareClass, ShareRegistry};
use crate::state::{FundState, Investment, LedgerSnapshot};

/// Read-only projection of the fund's headline numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundStats {
    /// Available balance plus deployed capital
    pub aum: Amount,
    /// Capital in unexited investments
    pub total_deployed: Amount,
    /// Custody balance held by the fund
    pub available_balance: Amount,
    /// Cumulative exit proceeds
    pub total_returns: Amount,
    /// Cumulative dividends distributed
    pub total_dividends: Amount,
    /// Class A supply
    pub class_a_supply: Amount,
    /// Class B supply
    pub class_b_supply: Amount,
    /// NAV per share, scaled by 1e18
    pub nav_per_share: u128,
    /// Number of investments ever executed
    pub investment_count: u64,
}

impl FundStats {
    /// Combined supply of both classes
    pub fn total_shares(&self) -> u128 {
        self.class_a_supply as u128 + self.class_b_supply as u128
    }

    /// NAV per share as a decimal, for display
    pub fn nav_decimal(&self) -> Option<Decimal> {
        scaled_to_decimal(self.nav_per_share)
    }
}

/// Convert a 1e18-scaled value into a [`Decimal`]
pub fn scaled_to_decimal(value: u128) -> Option<Decimal> {
    let value = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(value, 18)
        .ok()
        .map(|d| d.normalize())
}

#[derive(Debug)]
struct LedgerState {
    fund: FundState,
    shares: ClassMap<ShareRegistry>,
    events: EventLog<LedgerEvent>,
}

impl LedgerState {
    fn total_shares(&self) -> LedgerResult<Amount> {
        Ok(math::add(
            self.shares.class_a.total_supply(),
            self.shares.class_b.total_supply(),
        )?)
    }

    fn pending(&self, holder: &AccountId, class: ShareClass) -> LedgerResult<Amount> {
        let balance = self.shares.get(class).balance_of(holder);
        let owed = self
            .fund
            .dividends_per_share
            .saturating_sub(self.fund.baseline(holder, class));
        if balance == 0 || owed == 0 {
            return Ok(0);
        }
        Ok(math::to_amount(math::mul_div(balance as u128, owed, SCALE)?)?)
    }
}

/// Pooled-capital ledger with two share classes
pub struct Ledger {
    operator: AccountId,
    fund_account: AccountId,
    config: LedgerConfig,
    asset: Arc<dyn CustodyAsset>,
    clock: Arc<dyn Clock>,
    guard: ReentrancyGuard,
    state: RwLock<LedgerState>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("operator", &self.operator)
            .field("fund_account", &self.fund_account)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Create an empty fund
    pub fn new(
        operator: AccountId,
        fund_account: AccountId,
        config: LedgerConfig,
        asset: Arc<dyn CustodyAsset>,
        clock: Arc<dyn Clock>,
    ) -> LedgerResult<Self> {
        let now = clock.now();
        let snapshot = LedgerSnapshot {
            operator,
            fund_account,
            config,
            fund: FundState::new(now),
            shares: ClassMap::new(
                ShareRegistry::new(ShareClass::ClassA),
                ShareRegistry::new(ShareClass::ClassB),
            ),
            events: EventLog::new(),
        };
        let ledger = Self::restore(snapshot, asset, clock)?;
        info!(
            "Created ledger for fund account {} operated by {}",
            ledger.fund_account, ledger.operator
        );
        Ok(ledger)
    }

    /// Rebuild a ledger from a snapshot
    pub fn restore(
        snapshot: LedgerSnapshot,
        asset: Arc<dyn CustodyAsset>,
        clock: Arc<dyn Clock>,
    ) -> LedgerResult<Self> {
        snapshot.config.validate()?;
        require_identity(&snapshot.operator, "operator")?;
        require_identity(&snapshot.fund_account, "fund account")?;
        if snapshot.operator == snapshot.fund_account {
            return Err(LedgerError::InvalidParameter(
                "operator and fund account must differ".to_string(),
            ));
        }
        if snapshot.shares.class_a.class() != ShareClass::ClassA
            || snapshot.shares.class_b.class() != ShareClass::ClassB
        {
            return Err(LedgerError::InvalidParameter(
                "share registries are out of order".to_string(),
            ));
        }

        Ok(Self {
            operator: snapshot.operator,
            fund_account: snapshot.fund_account,
            config: snapshot.config,
            asset,
            clock,
            guard: ReentrancyGuard::new("ledger"),
            state: RwLock::new(LedgerState {
                fund: snapshot.fund,
                shares: snapshot.shares,
                events: snapshot.events,
            }),
        })
    }

    /// Capture the ledger's full state
    pub fn snapshot(&self) -> LedgerResult<LedgerSnapshot> {
        let state = self.read()?;
        Ok(LedgerSnapshot {
            operator: self.operator.clone(),
            fund_account: self.fund_account.clone(),
            config: self.config.clone(),
            fund: state.fund.clone(),
            shares: state.shares.clone(),
            events: state.events.clone(),
        })
    }

    /// Deposit `amount` of the custody asset and mint shares of `class`.
    ///
    /// The first deposit into an empty fund mints 1:1; later deposits mint
    /// `floor(amount * total_shares / aum)`. The depositor's dividend
    /// baseline for `class` is reset to the current accumulator.
    pub fn deposit(&self, caller: &AccountId, amount: Amount, class: ShareClass) -> LedgerResult<Amount> {
        let _token = self.guard.enter()?;
        require_positive(amount, "deposit amount")?;
        require_identity(caller, "depositor")?;

        let available = self.available_balance()?;
        let shares = {
            let state = self.read()?;
            let total_shares = state.total_shares()?;
            let shares = if total_shares == 0 {
                amount
            } else {
                let aum = math::add(available, state.fund.total_deployed)?;
                if aum == 0 {
                    return Err(LedgerError::InvalidParameter(
                        "fund has shares outstanding but no assets".to_string(),
                    ));
                }
                math::to_amount(math::mul_div(amount as u128, total_shares as u128, aum as u128)?)?
            };
            if shares == 0 {
                return Err(LedgerError::InvalidParameter(format!(
                    "deposit of {} is too small to mint a share",
                    amount
                )));
            }
            state.shares.get(class).check_mint(caller, shares)?;
            debug!("Deposit of {} mints {} class {} shares", amount, shares, class);
            shares
        };

        self.asset.transfer_from(caller, &self.fund_account, amount)?;

        let mut state = self.write()?;
        state.shares.get_mut(class).mint(caller, shares)?;
        let accumulator = state.fund.dividends_per_share;
        state.fund.set_baseline(caller, class, accumulator);
        self.emit(
            &mut state,
            LedgerEvent::Deposited {
                holder: caller.clone(),
                class,
                amount,
                shares,
            },
        );
        Ok(shares)
    }

    /// Deploy `amount` of available capital to `target` (operator only)
    pub fn execute_investment(
        &self,
        caller: &AccountId,
        target: &AccountId,
        amount: Amount,
        equity_bps: BasisPoints,
    ) -> LedgerResult<u64> {
        let _token = self.guard.enter()?;
        self.require_operator(caller)?;
        require_positive(amount, "investment amount")?;
        require_equity(equity_bps)?;
        require_identity(target, "investment target")?;
        if *target == self.fund_account {
            return Err(LedgerError::InvalidParameter(
                "cannot invest in the fund account".to_string(),
            ));
        }

        let available = self.available_balance()?;
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let deployed = {
            let state = self.read()?;
            math::add(state.fund.total_deployed, amount)?
        };

        self.asset.transfer(&self.fund_account, target, amount)?;

        let mut state = self.write()?;
        let id = state.fund.investments.len() as u64;
        state.fund.investments.push(Investment {
            id,
            target: target.clone(),
            amount,
            equity_bps,
            timestamp: self.clock.now(),
            exited: false,
            return_amount: 0,
        });
        state.fund.total_deployed = deployed;
        self.emit(
            &mut state,
            LedgerEvent::InvestmentExecuted {
                id,
                target: target.clone(),
                amount,
                equity_bps,
            },
        );
        Ok(id)
    }

    /// Record the exit of investment `id` and pay carry on any profit.
    ///
    /// Returned capital is expected to reach the fund account through the
    /// custody asset; this call only does the bookkeeping. Returns the carry
    /// paid to the operator.
    pub fn record_return(&self, caller: &AccountId, id: u64, return_amount: Amount) -> LedgerResult<Amount> {
        let _token = self.guard.enter()?;
        self.require_operator(caller)?;

        let (profit, carry, deployed, returns) = {
            let state = self.read()?;
            let investment = state
                .fund
                .investments
                .get(id as usize)
                .ok_or(LedgerError::InvalidId(id))?;
            if investment.exited {
                return Err(LedgerError::AlreadyExited(id));
            }
            let profit = return_amount.saturating_sub(investment.amount);
            let carry = math::bps_of(profit, self.config.carry_bps)?;
            let deployed = math::sub(state.fund.total_deployed, investment.amount)?;
            let returns = math::add(state.fund.total_returns, return_amount)?;
            (profit, carry, deployed, returns)
        };

        if carry > 0 {
            let available = self.available_balance()?;
            if available < carry {
                return Err(LedgerError::InsufficientBalance {
                    needed: carry,
                    available,
                });
            }
            self.asset.transfer(&self.fund_account, &self.operator, carry)?;
        }

        let mut state = self.write()?;
        if let Some(investment) = state.fund.investments.get_mut(id as usize) {
            investment.exited = true;
            investment.return_amount = return_amount;
        }
        state.fund.total_deployed = deployed;
        state.fund.total_returns = returns;
        self.emit(
            &mut state,
            LedgerEvent::ReturnRecorded {
                id,
                return_amount,
                profit,
                carry,
            },
        );
        Ok(carry)
    }

    /// Burn `shares` of `class` and pay out the holder's slice of the
    /// available balance.
    ///
    /// The payout is `floor(shares * available / total_shares)`: redemptions
    /// only draw on undeployed capital, so while most of the fund is deployed
    /// a redeeming holder receives less than NAV.
    pub fn redeem(&self, caller: &AccountId, shares: Amount, class: ShareClass) -> LedgerResult<Amount> {
        let _token = self.guard.enter()?;
        require_positive(shares, "redeemed shares")?;

        let available = self.available_balance()?;
        let payout = {
            let state = self.read()?;
            let held = state.shares.get(class).balance_of(caller);
            if held < shares {
                return Err(LedgerError::InsufficientBalance {
                    needed: shares,
                    available: held,
                });
            }
            let total_shares = state.total_shares()?;
            math::to_amount(math::mul_div(shares as u128, available as u128, total_shares as u128)?)?
        };
        if payout == 0 {
            // no liquidity to pay for these shares
            return Err(LedgerError::InsufficientBalance {
                needed: 1,
                available: payout,
            });
        }

        self.asset.transfer(&self.fund_account, caller, payout)?;

        let mut state = self.write()?;
        state.shares.get_mut(class).burn(caller, shares)?;
        self.emit(
            &mut state,
            LedgerEvent::Redeemed {
                holder: caller.clone(),
                class,
                shares,
                amount: payout,
            },
        );
        Ok(payout)
    }

    /// Declare a dividend of `amount` across all shares (operator only).
    ///
    /// No funds move; holders pull their share with
    /// [`Ledger::claim_dividends`]. Returns the accumulator increment.
    pub fn distribute_dividends(&self, caller: &AccountId, amount: Amount) -> LedgerResult<u128> {
        let _token = self.guard.enter()?;
        self.require_operator(caller)?;
        require_positive(amount, "dividend amount")?;

        let available = self.available_balance()?;
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }

        let mut state = self.write()?;
        let total_shares = state.total_shares()?;
        if total_shares == 0 {
            return Err(LedgerError::InvalidParameter(
                "no shares outstanding".to_string(),
            ));
        }
        let increment = math::mul_div(amount as u128, SCALE, total_shares as u128)?;
        if increment == 0 {
            return Err(LedgerError::InvalidParameter(format!(
                "dividend of {} is too small for {} shares",
                amount, total_shares
            )));
        }
        let accumulator = state
            .fund
            .dividends_per_share
            .checked_add(increment)
            .ok_or(math::MathError::Overflow)?;
        let total_dividends = math::add(state.fund.total_dividends, amount)?;

        state.fund.dividends_per_share = accumulator;
        state.fund.total_dividends = total_dividends;
        self.emit(
            &mut state,
            LedgerEvent::DividendDistributed {
                amount,
                per_share: increment,
            },
        );
        Ok(increment)
    }

    /// Pay out the caller's pending dividends on `class`
    pub fn claim_dividends(&self, caller: &AccountId, class: ShareClass) -> LedgerResult<Amount> {
        let _token = self.guard.enter()?;

        let (pending, accumulator) = {
            let state = self.read()?;
            (state.pending(caller, class)?, state.fund.dividends_per_share)
        };
        if pending == 0 {
            debug!("No class {} dividends pending for {}", class, caller);
            return Ok(0);
        }

        let available = self.available_balance()?;
        if available < pending {
            return Err(LedgerError::InsufficientBalance {
                needed: pending,
                available,
            });
        }
        self.asset.transfer(&self.fund_account, caller, pending)?;

        let mut state = self.write()?;
        state.fund.set_baseline(caller, class, accumulator);
        self.emit(
            &mut state,
            LedgerEvent::DividendsClaimed {
                holder: caller.clone(),
                class,
                amount: pending,
            },
        );
        Ok(pending)
    }

    /// Collect the time-prorated management fee (operator only).
    ///
    /// When nothing has accrued, or the fund cannot cover the fee, this is a
    /// no-op returning 0 and the accrual window keeps growing.
    pub fn collect_management_fee(&self, caller: &AccountId) -> LedgerResult<Amount> {
        let _token = self.guard.enter()?;
        self.require_operator(caller)?;

        let now = self.clock.now();
        let available = self.available_balance()?;
        let (fee, elapsed) = {
            let state = self.read()?;
            let elapsed = now.saturating_sub(state.fund.last_fee_collection);
            let aum = math::add(available, state.fund.total_deployed)?;
            (self.fee_for(aum, elapsed)?, elapsed)
        };
        if fee == 0 {
            debug!("No management fee accrued over {}s", elapsed);
            return Ok(0);
        }
        if available < fee {
            warn!(
                "Skipping management fee of {}: only {} available",
                fee, available
            );
            return Ok(0);
        }

        self.asset.transfer(&self.fund_account, &self.operator, fee)?;

        let mut state = self.write()?;
        state.fund.last_fee_collection = now;
        self.emit(
            &mut state,
            LedgerEvent::ManagementFeeCollected {
                amount: fee,
                elapsed_secs: elapsed,
            },
        );
        Ok(fee)
    }

    /// Move `shares` of `class` from `caller` to `to`.
    ///
    /// The recipient's dividend baseline for `class` is reset to the current
    /// accumulator; the sender keeps theirs.
    pub fn transfer_shares(
        &self,
        caller: &AccountId,
        to: &AccountId,
        shares: Amount,
        class: ShareClass,
    ) -> LedgerResult<()> {
        let _token = self.guard.enter()?;
        require_positive(shares, "transferred shares")?;
        require_identity(to, "share recipient")?;

        let mut state = self.write()?;
        state.shares.get_mut(class).transfer(caller, to, shares)?;
        if caller != to {
            let accumulator = state.fund.dividends_per_share;
            state.fund.set_baseline(to, class, accumulator);
        }
        self.emit(
            &mut state,
            LedgerEvent::SharesTransferred {
                from: caller.clone(),
                to: to.clone(),
                class,
                shares,
            },
        );
        Ok(())
    }

    /// AUM per share scaled by 1e18; par (1e18) while no shares exist
    pub fn nav_per_share(&self) -> LedgerResult<u128> {
        let available = self.available_balance()?;
        let state = self.read()?;
        nav(available, &state)
    }

    /// Headline numbers for the fund
    pub fn fund_stats(&self) -> LedgerResult<FundStats> {
        let available = self.available_balance()?;
        let state = self.read()?;
        Ok(FundStats {
            aum: math::add(available, state.fund.total_deployed)?,
            total_deployed: state.fund.total_deployed,
            available_balance: available,
            total_returns: state.fund.total_returns,
            total_dividends: state.fund.total_dividends,
            class_a_supply: state.shares.class_a.total_supply(),
            class_b_supply: state.shares.class_b.total_supply(),
            nav_per_share: nav(available, &state)?,
            investment_count: state.fund.investments.len() as u64,
        })
    }

    /// Custody balance held by the fund account
    pub fn available_balance(&self) -> LedgerResult<Amount> {
        Ok(self.asset.balance_of(&self.fund_account)?)
    }

    /// Available balance plus deployed capital
    pub fn aum(&self) -> LedgerResult<Amount> {
        let available = self.available_balance()?;
        let deployed = self.total_deployed()?;
        Ok(math::add(available, deployed)?)
    }

    pub fn total_deployed(&self) -> LedgerResult<Amount> {
        Ok(self.read()?.fund.total_deployed)
    }

    /// Current per-share dividend accumulator, scaled by 1e18
    pub fn dividends_per_share(&self) -> LedgerResult<u128> {
        Ok(self.read()?.fund.dividends_per_share)
    }

    pub fn investment(&self, id: u64) -> LedgerResult<Investment> {
        self.read()?
            .fund
            .investments
            .get(id as usize)
            .cloned()
            .ok_or(LedgerError::InvalidId(id))
    }

    pub fn investments(&self) -> LedgerResult<Vec<Investment>> {
        Ok(self.read()?.fund.investments.clone())
    }

    /// Dividends `holder` could claim on `class` right now
    pub fn pending_dividends(&self, holder: &AccountId, class: ShareClass) -> LedgerResult<Amount> {
        self.read()?.pending(holder, class)
    }

    /// Management fee that has accrued since the last collection
    pub fn accrued_management_fee(&self) -> LedgerResult<Amount> {
        let now = self.clock.now();
        let available = self.available_balance()?;
        let state = self.read()?;
        let elapsed = now.saturating_sub(state.fund.last_fee_collection);
        let aum = math::add(available, state.fund.total_deployed)?;
        self.fee_for(aum, elapsed)
    }

    pub fn share_balance(&self, holder: &AccountId, class: ShareClass) -> LedgerResult<Amount> {
        Ok(self.read()?.shares.get(class).balance_of(holder))
    }

    pub fn share_supply(&self, class: ShareClass) -> LedgerResult<Amount> {
        Ok(self.read()?.shares.get(class).total_supply())
    }

    /// Holders of `class` with a non-zero balance
    pub fn shareholders(&self, class: ShareClass) -> LedgerResult<Vec<(AccountId, Amount)>> {
        Ok(self
            .read()?
            .shares
            .get(class)
            .holders()
            .map(|(holder, balance)| (holder.clone(), balance))
            .collect())
    }

    /// Current Class A balance of `holder`
    pub fn voting_power(&self, holder: &AccountId) -> LedgerResult<Amount> {
        self.share_balance(holder, ShareClass::ClassA)
    }

    /// Class A balance of `holder` as of a registry epoch
    pub fn voting_power_at(&self, holder: &AccountId, epoch: u64) -> LedgerResult<Amount> {
        Ok(self.read()?.shares.class_a.balance_at(holder, epoch))
    }

    /// Current Class A supply
    pub fn voting_supply(&self) -> LedgerResult<Amount> {
        self.share_supply(ShareClass::ClassA)
    }

    /// Class A supply as of a registry epoch
    pub fn voting_supply_at(&self, epoch: u64) -> LedgerResult<Amount> {
        Ok(self.read()?.shares.class_a.total_supply_at(epoch))
    }

    /// Current Class A registry epoch
    pub fn share_epoch(&self) -> LedgerResult<u64> {
        Ok(self.read()?.shares.class_a.epoch())
    }

    pub fn operator(&self) -> &AccountId {
        &self.operator
    }

    pub fn fund_account(&self) -> &AccountId {
        &self.fund_account
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Every event emitted so far, oldest first
    pub fn events(&self) -> LedgerResult<Vec<EventRecord<LedgerEvent>>> {
        Ok(self.read()?.events.records().to_vec())
    }

    /// Whether a mutation is currently in flight
    pub fn is_busy(&self) -> bool {
        self.guard.is_entered()
    }

    fn fee_for(&self, aum: Amount, elapsed: u64) -> LedgerResult<Amount> {
        let annual = aum as u128 * self.config.management_fee_bps as u128;
        let denominator = BPS_DENOMINATOR * self.config.seconds_per_year as u128;
        Ok(math::to_amount(math::mul_div(annual, elapsed as u128, denominator)?)?)
    }

    fn require_operator(&self, caller: &AccountId) -> LedgerResult<()> {
        if *caller != self.operator {
            warn!("Rejected privileged ledger call from {}", caller);
            return Err(LedgerError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn emit(&self, state: &mut LedgerState, event: LedgerEvent) {
        info!("Ledger event {}: {:?}", event.name(), event);
        state.events.push(self.clock.now(), event);
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, LedgerState>> {
        self.state.read().map_err(|_| LedgerError::StatePoisoned)
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state.write().map_err(|_| LedgerError::StatePoisoned)
    }
}

fn nav(available: Amount, state: &LedgerState) -> LedgerResult<u128> {
    let total_shares = state.total_shares()?;
    if total_shares == 0 {
        return Ok(SCALE);
    }
    let aum = math::add(available, state.fund.total_deployed)?;
    Ok(math::mul_div(aum as u128, SCALE, total_shares as u128)?)
}

fn require_positive(value: Amount, what: &str) -> LedgerResult<()> {
    if value == 0 {
        return Err(LedgerError::InvalidParameter(format!("{} must be positive", what)));
    }
    Ok(())
}

fn require_identity(account: &AccountId, what: &str) -> LedgerResult<()> {
    if account.is_null() {
        return Err(LedgerError::InvalidParameter(format!("{} must not be empty", what)));
    }
    Ok(())
}

/// Check that an equity percentage lies in `1..=10000` basis points
pub fn require_equity(equity_bps: BasisPoints) -> LedgerResult<()> {
    if equity_bps == 0 || equity_bps as u128 > BPS_DENOMINATOR {
        return Err(LedgerError::InvalidParameter(format!(
            "equity must be between 1 and 10000 bps, got {}",
            equity_bps
        )));
    }
    Ok(())
}
