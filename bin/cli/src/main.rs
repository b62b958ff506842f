use anyhow::Result;
use clap::Parser;

use syndicate_cli::{commands, run, Cli};
use syndicate_config::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging from -v, falling back to the fund's configured level
    init_logging(&commands::log_level(&cli).await)?;

    let output = run(cli).await?;
    println!("{}", output);

    Ok(())
}
