//! Tally rules
//!
//! Quorum and approval are integer comparisons in basis points, so the
//! boundaries are exact: 30% participation meets a 3000 bps quorum and 51%
//! in favour meets a 5100 bps approval bar.

use serde::{Deserialize, Serialize};

use syndicate_common::{Amount, BasisPoints, MathError, BPS_DENOMINATOR};

/// Accumulated vote weight on a proposal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub votes_for: u128,
    pub votes_against: u128,
}

impl Tally {
    /// Add `weight` to one side
    pub fn record(&mut self, support: bool, weight: u128) -> Result<(), MathError> {
        let side = if support {
            &mut self.votes_for
        } else {
            &mut self.votes_against
        };
        *side = side.checked_add(weight).ok_or(MathError::Overflow)?;
        Ok(())
    }

    /// Total weight cast
    pub fn participation(&self) -> u128 {
        self.votes_for.saturating_add(self.votes_against)
    }

    /// `participation * 10000 >= supply * quorum_bps`
    pub fn meets_quorum(&self, supply: u128, quorum_bps: BasisPoints) -> bool {
        scaled_at_least(self.participation(), BPS_DENOMINATOR, supply, quorum_bps as u128)
    }

    /// `votes_for * 10000 >= participation * approval_bps`, with at least
    /// one vote cast
    pub fn is_approved(&self, approval_bps: BasisPoints) -> bool {
        self.participation() > 0
            && scaled_at_least(
                self.votes_for,
                BPS_DENOMINATOR,
                self.participation(),
                approval_bps as u128,
            )
    }
}

/// Whether deploying `amount` out of `aum` needs a vote:
/// `amount * 10000 >= aum * threshold_bps`, compared without rounding
pub fn requires_vote(amount: Amount, aum: Amount, threshold_bps: BasisPoints) -> bool {
    scaled_at_least(amount as u128, BPS_DENOMINATOR, aum as u128, threshold_bps as u128)
}

// a * b >= c * d without overflowing
fn scaled_at_least(a: u128, b: u128, c: u128, d: u128) -> bool {
    match (a.checked_mul(b), c.checked_mul(d)) {
        (Some(left), Some(right)) => left >= right,
        (None, Some(_)) => true,
        (Some(_), None) => false,
        (None, None) => {
            // both sides are huge; fall back to a widened comparison
            let (left_hi, left_lo) = widening_mul(a, b);
            let (right_hi, right_lo) = widening_mul(c, d);
            (left_hi, left_lo) >= (right_hi, right_lo)
        }
    }
}

fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let lo_lo = a_lo * b_lo;
    let hi_lo = a_hi * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_hi = a_hi * b_hi;

    let cross = (lo_lo >> 64) + (hi_lo & MASK) + (lo_hi & MASK);
    let low = (cross << 64) | (lo_lo & MASK);
    let high = hi_hi + (hi_lo >> 64) + (lo_hi >> 64) + (cross >> 64);
    (high, low)
}
