//! stellar-wallet — command-line front end for the wallet engine.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stellar_wallet_core::{
    BalanceSummary, FundingOutcome, PaymentRequest, RecordStore, StartupReport, WalletConfig,
    WalletEngine, WalletServices,
};
use stellar_wallet_types::Network;
use stellar_wallet_utils::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "stellar-wallet", about = "Single-account Stellar wallet")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "STELLAR_WALLET_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the wallet record file.
    #[arg(long, env = "STELLAR_WALLET_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Horizon endpoint for the test network.
    #[arg(long, env = "STELLAR_WALLET_TESTNET_HORIZON")]
    testnet_horizon_url: Option<String>,

    /// Horizon endpoint for the production network.
    #[arg(long, env = "STELLAR_WALLET_PUBLIC_HORIZON")]
    public_horizon_url: Option<String>,

    /// Friendbot endpoint.
    #[arg(long, env = "STELLAR_WALLET_FRIENDBOT")]
    friendbot_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STELLAR_WALLET_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STELLAR_WALLET_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Show the wallet address and masked secret key.
    Address,
    /// Fetch and show the native balance.
    Balance,
    /// Switch to "testnet" or "public" and show the balance there.
    Network { network: Network },
    /// Send a native payment.
    Send {
        /// Destination account (G…).
        destination: String,
        /// Amount in XLM, up to 7 decimal places.
        amount: String,
        /// Optional text memo, at most 28 bytes.
        #[arg(long)]
        memo: Option<String>,
    },
    /// List recent transactions, newest first.
    History {
        /// Number of entries (defaults to the configured limit).
        #[arg(long)]
        limit: Option<u32>,
    },
}

/// File settings (or defaults) with flags and env vars applied on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<WalletConfig> {
    let mut config = match &cli.config {
        Some(path) => WalletConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => WalletConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(url) = &cli.testnet_horizon_url {
        config.testnet_horizon_url = url.clone();
    }
    if let Some(url) = &cli.public_horizon_url {
        config.public_horizon_url = url.clone();
    }
    if let Some(url) = &cli.friendbot_url {
        config.friendbot_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn print_balance(network: Network, summary: &BalanceSummary) {
    match summary {
        BalanceSummary::Funded { balance } => println!("Balance: {balance} XLM ({network})"),
        BalanceSummary::Unfunded => println!("Account is not funded on {network}"),
        BalanceSummary::NoNativeBalance => println!("No XLM balance on {network}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(config.log_format, &config.log_level);

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    let store = RecordStore::new(config.wallet_path());
    tracing::debug!(path = %store.path().display(), "opening wallet record");
    let services = WalletServices::from_config(&config)?;
    let (mut engine, report) = WalletEngine::load_or_create(store, services)
        .await
        .context("failed to open wallet")?;

    if let StartupReport::Created { funding } = &report {
        println!("Created new wallet {}", engine.address());
        match funding {
            FundingOutcome::Funded => println!("Funded by friendbot on {}", engine.network()),
            FundingOutcome::Failed(e) => println!("Funding failed: {e}"),
        }
    }

    match cli.command {
        Command::Address => {
            println!("Address: {}", engine.address());
            println!("Secret:  {}", engine.record().keys().masked_secret());
            println!("Network: {}", engine.network());
        }
        Command::Balance => {
            let summary = engine.refresh_balance().await?;
            print_balance(engine.network(), &summary);
        }
        Command::Network { network } => {
            engine.switch_network(network).await?;
            println!("Switched to {network}");
            let summary = engine.refresh_balance().await?;
            print_balance(network, &summary);
        }
        Command::Send {
            destination,
            amount,
            memo,
        } => {
            let request = PaymentRequest {
                destination,
                amount,
                memo,
            };
            let receipt = engine.send_payment(request).await?;
            println!("Transaction submitted: {}", receipt.hash);
            if let Some(ledger) = receipt.ledger {
                println!("Included in ledger {ledger}");
            }
            match &receipt.refresh {
                Ok(summary) => print_balance(engine.network(), summary),
                Err(e) => println!("Balance refresh failed: {e}"),
            }
        }
        Command::History { limit } => {
            let limit = limit.unwrap_or(config.default_history_limit);
            let history = engine.list_history(limit).await?;
            if history.is_empty() {
                println!("No transactions on {}", engine.network());
            }
            for tx in history {
                println!(
                    "{}  {}  fee {} XLM",
                    tx.ledger_close_time,
                    tx.hash,
                    tx.fee_display()
                );
            }
        }
    }
    Ok(())
}
