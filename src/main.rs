// src/main.rs
//! dApp deployer entry point
//! Connects a wallet, prints account information and deploys the example contracts.
use anyhow::Result;
use clap::Parser;
use dapp_deployer::blockchain::artifact::ContractArtifact;
use dapp_deployer::blockchain::connector::WsConnector;
use dapp_deployer::blockchain::deployer::ContractKind;
use dapp_deployer::cli::{Cli, Commands, DeployTarget, SessionArgs};
use dapp_deployer::config::load_app_config;
use dapp_deployer::core::config::AppConfig;
use dapp_deployer::session::{DeployOutcome, SessionController, SessionSettings};
use dapp_deployer::wallet::keystore::KeystoreHost;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging()?;

    info!("Starting dapp-deployer v{}", env!("CARGO_PKG_VERSION"));

    let config = load_app_config(cli.config.as_deref())?;
    let controller = build_controller(&config)?;

    match cli.command {
        Commands::Info(session) => {
            open_session(&controller, &session).await?;
        }
        Commands::Deploy { target, session } => {
            open_session(&controller, &session).await?;
            deploy(&controller, target).await?;
        }
    }

    println!("{}", controller.view());
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_controller(config: &AppConfig) -> Result<SessionController> {
    let host = KeystoreHost::from_entries(&config.wallets)?;
    if config.wallets.is_empty() {
        warn!("No wallets configured; nothing will be authorized");
    }
    let connector = WsConnector::new(Duration::from_secs(config.node.ready_timeout_secs));

    let mut controller =
        SessionController::new(SessionSettings::from(config), Arc::new(connector), Arc::new(host));

    // A missing artifact only disables deploying that kind.
    let artifacts = [
        (ContractKind::Profile, &config.contracts.profile),
        (ContractKind::Ticket, &config.contracts.ticket),
    ];
    for (kind, path) in artifacts {
        match ContractArtifact::from_file(kind.contract_name(), path) {
            Ok(artifact) => controller = controller.with_artifact(kind, artifact),
            Err(e) => warn!(%kind, path = %path.display(), "Failed to load artifact: {}", e),
        }
    }
    Ok(controller)
}

async fn open_session(controller: &SessionController, args: &SessionArgs) -> Result<()> {
    if let Some(url) = &args.url {
        controller.set_node_url(url.as_str());
    }
    controller.connect_wallet().await?;

    if let Some(wallet) = &args.wallet {
        controller.select_extension(wallet).await?;
    }
    if let Some(account) = &args.account {
        controller.select_account(account).await?;
    }
    Ok(())
}

async fn deploy(controller: &SessionController, target: DeployTarget) -> Result<()> {
    let mut failed = 0;
    for kind in target.kinds() {
        match controller.deploy(kind).await {
            Ok(DeployOutcome::Deployed(deployed)) => {
                info!(%kind, address = %deployed.address_checksum(), tx = ?deployed.tx_hash, "Contract deployed");
            }
            Ok(DeployOutcome::AlreadyDeployed(_)) | Ok(DeployOutcome::InFlight) => {}
            Ok(DeployOutcome::NoSigner) => {
                warn!(%kind, "No signer available; connect a wallet with at least one account");
            }
            // Already recorded on the session and rendered in the view.
            Err(_) => failed += 1,
        }
    }
    if failed > 0 {
        println!("{}", controller.view());
        anyhow::bail!("{} deployment(s) failed", failed);
    }
    Ok(())
}
