//! Syndicate
//!
//! A pooled-capital fund with voting (Class A) and non-voting (Class B)
//! shares, where large capital deployments are gated by a Class A vote.

pub mod fund;

pub use fund::{Fund, FundError, FundResult, FundSnapshot};

/// Module version information
pub mod version {
    /// The current version of the Syndicate library
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Re-export the component crates
pub mod common {
    pub use syndicate_common::*;
}

pub mod ledger {
    pub use syndicate_ledger::*;
}

pub mod governance {
    pub use syndicate_governance::*;
}

pub mod config {
    pub use syndicate_config::*;
}

#[cfg(test)]
mod tests {
    #[test]
    fn version_is_available() {
        assert!(!super::version::VERSION.is_empty());
    }
}
