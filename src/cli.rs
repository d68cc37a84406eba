use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::blockchain::deployer::ContractKind;

/// dApp deployer CLI (library-facing definitions)
#[derive(Debug, Parser)]
#[command(
    name = "dapp-deployer",
    about = "Connect a wallet, inspect the account and deploy the example contracts",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Path to the TOML config file (falls back to DAPP_CONFIG_PATH, then config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Connect and print account information
    Info(SessionArgs),
    /// Connect and deploy one or both contracts
    Deploy {
        #[arg(value_enum)]
        target: DeployTarget,
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
    /// Node WebSocket URL, overrides the configured one
    #[arg(long)]
    pub url: Option<String>,
    /// Wallet extension to select by name
    #[arg(long)]
    pub wallet: Option<String>,
    /// Account address to select
    #[arg(long)]
    pub account: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeployTarget {
    Profile,
    Ticket,
    All,
}

impl DeployTarget {
    pub fn kinds(self) -> Vec<ContractKind> {
        match self {
            DeployTarget::Profile => vec![ContractKind::Profile],
            DeployTarget::Ticket => vec![ContractKind::Ticket],
            DeployTarget::All => ContractKind::ALL.to_vec(),
        }
    }
}
