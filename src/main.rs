//! Operator CLI for attestation-based event access.
//!
//! ```text
//! access-cli --config access.toml resolve <ADDRESS>
//! access-cli --config access.toml schema-action <UID> [ROLE_ID]
//! access-cli --config access.toml set-schema --uid <UID> --role-id <ROLE_ID> --action <N>
//! access-cli --config access.toml watch      # stdin: one address or "disconnect" per line
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use village_access::blockchain::{Action, TransactionOutcome, Wallet};
use village_access::config::load_config;
use village_access::lifecycle::{signals, Services, Shutdown};
use village_access::observability::{logging, metrics};
use village_access::session::{TracingNotifier, WalletEvent};

#[derive(Parser)]
#[command(name = "access-cli")]
#[command(about = "Resolve event roles and manage resolver rules", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "access.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the role and attestation count of an address
    Resolve { address: Address },
    /// Show the action currently granted to a role on a schema
    SchemaAction {
        uid: B256,
        /// Role to inspect; defaults to the configured villager role.
        role_id: Option<B256>,
    },
    /// Change the action granted to a role on a schema
    SetSchema {
        #[arg(long)]
        uid: B256,
        #[arg(long)]
        role_id: B256,
        #[arg(long)]
        action: u64,
        /// Native value to attach, in wei.
        #[arg(long, default_value = "0")]
        value: U256,
    },
    /// Track wallet events read from stdin and report session changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability);
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::Resolve { address } => {
            let services = Services::connect(config, None).await?;
            let resolution = services.role_resolver().resolve(address).await?;
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Commands::SchemaAction { uid, role_id } => {
            let services = Services::connect(config, None).await?;
            let action = services.schema_action(uid, role_id).await?;
            println!("{}", action);
        }
        Commands::SetSchema {
            uid,
            role_id,
            action,
            value,
        } => {
            let wallet = Wallet::from_env(config.chain.chain_id)?;
            let services = Services::connect(config, Some(&wallet)).await?;
            let outcome = services
                .write_orchestrator()
                .submit_role_mutation(wallet.address(), uid, role_id, Action(action), value)
                .await;
            match outcome {
                TransactionOutcome::Confirmed(receipt) => {
                    println!("{}", serde_json::to_string_pretty(&receipt)?);
                }
                TransactionOutcome::Failed(failure) => {
                    eprintln!("Error: {}", failure);
                    std::process::exit(1);
                }
            }
        }
        Commands::Watch => {
            let services = Services::connect(config, None).await?;
            watch(services).await?;
        }
    }

    Ok(())
}

async fn watch(services: Services) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = services
        .session_coordinator(Arc::new(TracingNotifier))
        .start();
    let mut session = coordinator.session();

    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c(shutdown.clone());
    let mut interrupted = shutdown.subscribe();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = interrupted.recv() => break,
            changed = session.changed() => {
                let Ok(state) = changed else { break };
                println!(
                    "{:?} address={} role={} count={} name={}",
                    state.status,
                    display(state.address),
                    display(state.role),
                    display(state.attestation_count),
                    display(state.display_name),
                );
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                let event = match line {
                    "" => continue,
                    "disconnect" => WalletEvent::Disconnected,
                    other => match other.parse::<Address>() {
                        Ok(address) => WalletEvent::Connected(address),
                        Err(e) => {
                            eprintln!("Ignoring '{}': {}", other, e);
                            continue;
                        }
                    },
                };
                coordinator.send(event);
            }
        }
    }

    coordinator.shutdown().await;
    Ok(())
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
