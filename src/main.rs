//! sui-multisend operator CLI.
//!
//! ```text
//! sui-multisend [--config FILE] health
//! sui-multisend coins   --owner 0x.. --coin-type 0x2::sui::SUI [--target N]
//! sui-multisend balance --owner 0x.. --coin-type 0x2::sui::SUI
//! sui-multisend send    --coin-type T --to 0xA=100 --to 0xB=250 [--dry-run]
//! sui-multisend events  --filter '{"Sender":"0x.."}' [--limit N] [--descending]
//! ```
//!
//! Endpoints and proxies come from the config file or the `SUI_RPC_URLS` /
//! `SUI_PROXIES` env vars (JSON arrays). Ctrl-C cancels the running command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sui_multisend::blockchain::types::{format_amount, EventId};
use sui_multisend::config::{load_config, load_from_env, ClientConfig};
use sui_multisend::lifecycle::{bootstrap, build_pool, init_observability, Shutdown};
use sui_multisend::transfer::{CoinSelector, MultiSender, TransferRequest};
use sui_multisend::{Ed25519Signer, SuiAddress, TransactionSigner};

#[derive(Parser)]
#[command(name = "sui-multisend")]
#[command(about = "Multi-recipient Sui transfers over a pool of RPC endpoints", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults plus env overrides when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every endpoint and report active/inactive
    Health,
    /// List owned coins of one type
    Coins {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        coin_type: String,
        /// Stop once this many base units are covered
        #[arg(long)]
        target: Option<u128>,
    },
    /// Total balance of one coin type
    Balance {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        coin_type: String,
    },
    /// Send exact amounts to several recipients in one transaction
    Send {
        #[arg(long)]
        coin_type: String,
        /// Recipient as ADDRESS=AMOUNT (base units); repeat per recipient
        #[arg(long = "to", required = true)]
        recipients: Vec<String>,
        /// Env var holding the signer's hex private key
        #[arg(long)]
        signer_env: Option<String>,
        /// Build and dry-run the transaction without submitting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Query events with a JSON filter
    Events {
        #[arg(long)]
        filter: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long)]
        descending: bool,
        /// Resume after this event, as TX_DIGEST:EVENT_SEQ
        #[arg(long)]
        cursor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config: ClientConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };
    init_observability(&config.observability);

    tracing::info!(
        endpoints = config.rpc.endpoints.len(),
        proxies = config.rpc.proxies.len(),
        max_retries = config.retry.max_retries,
        "sui-multisend v0.1.0 starting"
    );

    let shutdown = Shutdown::new();
    shutdown.listen_for_signals();
    let cancel = shutdown.token();

    match cli.command {
        Commands::Health => {
            let pool = build_pool(&config)?;
            let result = pool.check_health(&cancel).await;
            println!("{}", serde_json::to_string_pretty(&pool.last_report())?);
            result?;
        }
        Commands::Coins { owner, coin_type, target } => {
            let owner: SuiAddress = owner.parse()?;
            let pool = bootstrap(&config, &cancel).await?;
            let decimals = pool.coin_decimals(&coin_type, &cancel).await?;
            let selection = CoinSelector::new(&pool)
                .owned_coins(&owner, &coin_type, target, &cancel)
                .await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "coins": selection.coins,
                    "total": selection.total.to_string(),
                    "formatted": format_amount(selection.total, decimals),
                }))?
            );
        }
        Commands::Balance { owner, coin_type } => {
            let owner: SuiAddress = owner.parse()?;
            let pool = bootstrap(&config, &cancel).await?;
            let decimals = pool.coin_decimals(&coin_type, &cancel).await?;
            let balance = pool.balance(&owner, &coin_type, &cancel).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "coinType": balance.coin_type,
                    "coinObjectCount": balance.coin_object_count,
                    "totalBalance": balance.total_balance.to_string(),
                    "formatted": format_amount(balance.total_balance, decimals),
                }))?
            );
        }
        Commands::Send { coin_type, recipients, signer_env, dry_run } => {
            let entries = recipients
                .iter()
                .map(|entry| {
                    entry
                        .split_once('=')
                        .ok_or_else(|| format!("recipient '{entry}' must be ADDRESS=AMOUNT"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let request = TransferRequest::parse(coin_type.as_str(), &entries)?;

            let signer_env = signer_env.unwrap_or_else(|| config.transfer.signer_env.clone());
            let signer = Ed25519Signer::from_env(&signer_env)?;

            let pool = bootstrap(&config, &cancel).await?;
            let sender = MultiSender::new(&pool, config.transfer.gas_budget);

            if dry_run {
                let (plan, gas) = sender.preview(&request, &signer.address(), &cancel).await?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "plan": plan,
                        "change": plan.change_after_gas(&gas).to_string(),
                        "gas": gas,
                        "fee": gas.fee_info(),
                    }))?
                );
            } else {
                let receipt = sender.multi_send(&request, &signer, &cancel).await?;
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            }
        }
        Commands::Events { filter, limit, descending, cursor } => {
            let filter: serde_json::Value = serde_json::from_str(&filter)?;
            let cursor = cursor
                .map(|raw| {
                    raw.split_once(':')
                        .map(|(tx_digest, event_seq)| EventId {
                            tx_digest: tx_digest.to_string(),
                            event_seq: event_seq.to_string(),
                        })
                        .ok_or_else(|| format!("cursor '{raw}' must be TX_DIGEST:EVENT_SEQ"))
                })
                .transpose()?;
            let pool = bootstrap(&config, &cancel).await?;
            let page = pool
                .query_events(&filter, cursor.as_ref(), limit, descending, &cancel)
                .await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
    }

    tracing::info!("Done");
    Ok(())
}
