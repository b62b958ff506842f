//! Common types and utilities for Syndicate
//!
//! This crate provides the pieces shared by the ledger and governance
//! crates: caller identities, amount and timestamp types, fixed-point
//! arithmetic, the clock seam, and the per-instance reentrancy guard.

pub mod events;
pub mod guard;
pub mod identity;
pub mod math;
pub mod time;

pub use events::{EventLog, EventRecord};
pub use guard::{GuardError, ReentrancyGuard, ReentrancyToken};
pub use identity::AccountId;
pub use math::{MathError, BPS_DENOMINATOR, SCALE};
pub use time::{Clock, ManualClock, SystemClock};

/// An amount of the custody asset or of shares, in base units
pub type Amount = u64;

/// UNIX timestamp in seconds
pub type Timestamp = u64;

/// Basis points (1/10_000)
pub type BasisPoints = u64;
