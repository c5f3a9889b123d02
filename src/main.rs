use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airdrop_claimer::claim::ClaimOrchestrator;
use airdrop_claimer::config::load_config;
use airdrop_claimer::ledger::{Account, RpcGateway};
use airdrop_claimer::watcher::LivenessWatcher;

#[derive(Parser)]
#[command(name = "airdrop-claimer")]
#[command(about = "Claims gated token drops for a set of accounts", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "claimer.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airdrop_claimer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("airdrop-claimer v0.1.0 starting");

    let config = load_config(&cli.config)?;

    tracing::info!(
        rpc_http_url = %config.network.rpc_http_url,
        rpc_wss_url = %config.network.rpc_wss_url,
        accounts = config.accounts.len(),
        gas_mode = ?config.gas.mode(),
        "Configuration loaded"
    );

    let mut accounts = Vec::with_capacity(config.accounts.len());
    for entry in &config.accounts {
        accounts.push(Account::from_private_key(
            &entry.private_key,
            entry.forward_to.as_deref(),
        )?);
    }

    let gateway = Arc::new(RpcGateway::new(&config.network, &config.claim)?);

    let (height_tx, height_rx) = mpsc::channel(64);
    let watcher = LivenessWatcher::new(config.network.clone());
    tokio::spawn(watcher.run(height_tx));

    let orchestrator = ClaimOrchestrator::new(gateway, accounts, config.gas_policy());
    let summary = orchestrator.run(height_rx).await;

    tracing::info!(
        claims_succeeded = summary.claims_succeeded,
        transfers_succeeded = summary.transfers_succeeded,
        accounts_completed = summary.accounts_completed,
        total_accounts = summary.total_accounts,
        "Done"
    );

    Ok(())
}
