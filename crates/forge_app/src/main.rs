mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use forge_core::config::ForgeConfig;
use forge_core::{classify_error, logging};

use cli::Cli;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn load_config(cli: &Cli) -> anyhow::Result<ForgeConfig> {
    let mut config = ForgeConfig::load()?;
    cli.apply_to(&mut config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", classify_error(&e).user_message);
            eprintln!("  {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init_logging(&config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e:#}");
            None
        }
    };
    info!("Starting Forge v{VERSION}");

    match commands::run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let classified = classify_error(&e);
            error!(category = ?classified.category, "{e:#}");
            eprintln!("{}", classified.user_message);
            ExitCode::FAILURE
        }
    }
}
