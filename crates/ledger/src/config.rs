//! Ledger fee parameters

use serde::{Deserialize, Serialize};

use syndicate_common::{BasisPoints, BPS_DENOMINATOR};

use crate::error::{LedgerError, LedgerResult};

/// Fee configuration applied by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Share of exit profit paid to the operator, in basis points
    #[serde(default = "default_carry_bps")]
    pub carry_bps: BasisPoints,

    /// Annual management fee on AUM, in basis points
    #[serde(default = "default_management_fee_bps")]
    pub management_fee_bps: BasisPoints,

    /// Length of the fee year in seconds
    #[serde(default = "default_seconds_per_year")]
    pub seconds_per_year: u64,
}

fn default_carry_bps() -> BasisPoints {
    2_000
}

fn default_management_fee_bps() -> BasisPoints {
    200
}

fn default_seconds_per_year() -> u64 {
    31_536_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            carry_bps: default_carry_bps(),
            management_fee_bps: default_management_fee_bps(),
            seconds_per_year: default_seconds_per_year(),
        }
    }
}

impl LedgerConfig {
    /// Reject out-of-range fee settings
    pub fn validate(&self) -> LedgerResult<()> {
        if self.carry_bps as u128 > BPS_DENOMINATOR {
            return Err(LedgerError::InvalidParameter(format!(
                "carry_bps must be at most 10000, got {}",
                self.carry_bps
            )));
        }
        if self.management_fee_bps as u128 > BPS_DENOMINATOR {
            return Err(LedgerError::InvalidParameter(format!(
                "management_fee_bps must be at most 10000, got {}",
                self.management_fee_bps
            )));
        }
        if self.seconds_per_year == 0 {
            return Err(LedgerError::InvalidParameter(
                "seconds_per_year must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
