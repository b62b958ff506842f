use std::path::PathBuf;

use clap::{Parser, Subcommand};
use syndicate_ledger::ShareClass;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Syndicate pooled-capital fund")]
pub struct Cli {
    /// Sets the level of verbosity
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Fund state file
    #[clap(long, global = true, default_value = "./syndicate-state.json")]
    pub state: PathBuf,

    /// Pin the clock to this UNIX timestamp
    #[clap(long, global = true)]
    pub at: Option<u64>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a new fund state file
    Init {
        /// YAML configuration; the SYNDICATE_* environment is used otherwise
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing state file
        #[clap(long)]
        force: bool,
    },

    /// Credit an account with the custody asset
    Faucet {
        account: String,
        amount: u64,
    },

    /// Deposit the custody asset for shares
    Deposit {
        #[clap(long = "as")]
        caller: String,
        amount: u64,
        #[clap(short, long, default_value = "a")]
        class: ShareClass,
    },

    /// Burn shares for a NAV-priced payout
    Redeem {
        #[clap(long = "as")]
        caller: String,
        shares: u64,
        #[clap(short, long, default_value = "a")]
        class: ShareClass,
    },

    /// Move shares to another holder
    TransferShares {
        #[clap(long = "as")]
        caller: String,
        to: String,
        shares: u64,
        #[clap(short, long, default_value = "a")]
        class: ShareClass,
    },

    /// Deploy capital below the vote threshold
    Invest {
        #[clap(long = "as")]
        caller: String,
        target: String,
        amount: u64,
        /// Equity received, in basis points
        #[clap(short, long)]
        equity_bps: u64,
    },

    /// Record the exit of an investment
    RecordReturn {
        #[clap(long = "as")]
        caller: String,
        id: u64,
        amount: u64,
    },

    /// Distribute dividends to all shareholders
    Distribute {
        #[clap(long = "as")]
        caller: String,
        amount: u64,
    },

    /// Claim accrued dividends
    Claim {
        #[clap(long = "as")]
        caller: String,
        #[clap(short, long, default_value = "a")]
        class: ShareClass,
    },

    /// Collect the accrued management fee
    CollectFee {
        #[clap(long = "as")]
        caller: String,
    },

    /// Propose an investment for a Class A vote
    Propose {
        #[clap(long = "as")]
        caller: String,
        target: String,
        amount: u64,
        #[clap(short, long)]
        equity_bps: u64,
        #[clap(short, long, default_value = "")]
        description: String,
        /// Contract holding the equity position
        #[clap(long)]
        equity_contract: String,
    },

    /// Vote on a proposal
    Vote {
        #[clap(long = "as")]
        caller: String,
        id: u64,
        /// Vote against instead of for
        #[clap(long)]
        against: bool,
    },

    /// Execute an approved proposal
    Execute {
        #[clap(long = "as")]
        caller: String,
        id: u64,
    },

    /// Cancel a proposal
    Cancel {
        #[clap(long = "as")]
        caller: String,
        id: u64,
    },

    /// Show fund statistics
    Status {
        /// Also show this account's positions
        #[clap(long)]
        account: Option<String>,
    },

    /// Show one proposal, or all of them
    Proposal { id: Option<u64> },

    /// List investments
    Investments {},

    /// Print the event logs
    Events {
        /// Print records as JSON lines
        #[clap(long)]
        json: bool,
    },
}

impl Commands {
    /// Whether the command changes the fund
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Commands::Status { .. }
                | Commands::Proposal { .. }
                | Commands::Investments {}
                | Commands::Events { .. }
        )
    }
}
