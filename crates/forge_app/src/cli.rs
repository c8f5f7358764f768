use std::path::PathBuf;

use clap::{Parser, Subcommand};
use forge_core::{EnvOverrides, FeePolicyKind, ForgeConfig};

/// Deploy ERC-20 tokens through the Forge factory.
#[derive(Debug, Parser)]
#[command(name = "forge", version, about)]
pub struct Cli {
    /// Network to use (`base`, `ethereum`).
    #[arg(long, global = true)]
    pub chain: Option<String>,

    /// Factory contract address.
    #[arg(long, global = true)]
    pub factory: Option<String>,

    /// RPC endpoint for the selected chain.
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Compiled factory artifact (`{"abi": [...]}`) to decode events with.
    #[arg(long, global = true)]
    pub abi: Option<PathBuf>,

    /// Log level (`error`, `warn`, `info`, `debug`, `trace`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the creation fee the factory charges.
    Fee,

    /// Create a token.
    Create {
        #[arg(long)]
        name: String,

        /// Upper-cased and truncated to the configured length.
        #[arg(long)]
        symbol: String,

        /// Whole tokens.
        #[arg(long)]
        supply: String,

        /// Optional http(s) image URL.
        #[arg(long, default_value = "")]
        image: String,

        /// `on_chain` reads the fee from the factory, `fixed` attaches the configured fee.
        #[arg(long)]
        fee_policy: Option<FeePolicyKind>,

        /// Copy the token address to the clipboard.
        #[arg(long)]
        copy: bool,

        /// Print a Farcaster compose link for the new token.
        #[arg(long)]
        share: bool,
    },

    /// Submit explorer verification for every token the factory creates.
    VerifyListen {
        /// Start at this block instead of the chain head.
        #[arg(long)]
        from_block: Option<u64>,
    },

    /// Show the effective configuration.
    Config {
        /// Print only the config file path.
        #[arg(long)]
        path: bool,
    },
}

impl Cli {
    /// Fold command-line flags over a loaded config; flags win over the
    /// environment and the config file.
    pub fn apply_to(&self, config: &mut ForgeConfig) -> anyhow::Result<()> {
        config.apply_overrides(EnvOverrides {
            chain: self.chain.clone(),
            factory_address: self.factory.clone(),
            rpc_url: self.rpc_url.clone(),
            factory_abi_path: self.abi.clone(),
            log_level: self.log_level.clone(),
            ..EnvOverrides::default()
        })?;

        match &self.command {
            Command::Create {
                fee_policy: Some(kind),
                ..
            } => config.fee_policy = *kind,
            Command::VerifyListen {
                from_block: Some(block),
            } => config.verify_from_block = Some(*block),
            _ => {}
        }
        config.validate()
    }
}
