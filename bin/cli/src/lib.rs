//! Syndicate Command Line Interface Library
//!
//! Argument parsing, the on-disk fund state, and the command handlers
//! behind the `syndicate` binary.

pub mod cli;
pub mod commands;
pub mod state;

pub use cli::{Cli, Commands};
pub use commands::run;
pub use state::StateFile;

// Version and build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
