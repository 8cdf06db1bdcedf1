//! Main entry point for the `svetu-i18n` tool.

use anyhow::Result;
use clap::Parser;
use svetu_cli::{load_config, run, Cli};
use svetu_common::init_logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli).await?;
    let log_guard = init_logging(&config.logging)?;

    info!("Messages directory: {}", config.i18n.messages_dir.display());

    let mut stdout = std::io::stdout().lock();
    let outcome = match run(&cli, &config, &mut stdout).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Command failed: {:#}", e);
            return Err(e);
        }
    };

    drop(stdout);
    drop(log_guard);
    std::process::exit(outcome.exit_code());
}
