//! Pooled-capital ledger for Syndicate
//!
//! Tracks contributions into the fund through two share classes, capital
//! deployed into investments and the returns they bring back, pull-based
//! dividends, carry on profitable exits, and a time-prorated management fee.

pub mod asset;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod shares;
pub mod state;

pub use asset::{AssetSnapshot, CustodyAsset, InMemoryAsset, TransferHook};
pub use config::LedgerConfig;
pub use error::{AssetError, LedgerError, LedgerResult};
pub use events::LedgerEvent;
pub use ledger::{require_equity, scaled_to_decimal, FundStats, Ledger};
pub use shares::{Checkpoint, ClassMap, ShareClass, ShareRegistry};
pub use state::{FundState, Investment, LedgerSnapshot};
