use clap::{Parser, Subcommand};

use crate::chain::{AlloyChainClient, ChainClient};
use crate::config::{RelayerConfig, Settings, StrategyConfig};
use crate::error::{RelayerError, Result};

#[derive(Parser)]
#[command(name = "claim-relayer")]
#[command(version)]
#[command(about = "Gasless claim relayer: sends rewards from a hot wallet on request", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and per-environment overrides
    #[arg(long, env = "RELAYER_CONFIG_DIR", default_value = "config", global = true)]
    pub config_dir: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP relayer (default)
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Resolve configuration and report problems without serving
    CheckConfig {
        /// Also query the RPC endpoint for the hot-wallet balance
        #[arg(long = "rpc")]
        check_rpc: bool,
    },
}

/// Print the resolved configuration, optionally querying the RPC endpoint.
///
/// The signing key is never printed; only the address derived from it.
pub async fn check_config(settings: &Settings, check_rpc: bool) -> Result<()> {
    println!("Checking relayer configuration...\n");

    let config = match settings.resolve() {
        Ok(config) => config,
        Err(e) => {
            println!("  Configuration: \x1b[31mFAILED\x1b[0m");
            println!("    Error: {}", e);
            return Err(RelayerError::Config(e));
        }
    };

    println!("  Configuration: \x1b[32mOK\x1b[0m");
    print_summary(settings, &config);

    if check_rpc {
        print!("\n  Querying RPC endpoint... ");
        let chain =
            AlloyChainClient::connect(config.rpc_url.clone(), &config.signing_key, config.chain_id)?;
        match chain.native_balance().await {
            Ok(balance) => {
                println!("\x1b[32mOK\x1b[0m");
                println!("    Hot wallet balance: {} wei", balance);
                if balance < config.min_native_balance {
                    println!(
                        "    \x1b[33mWarning:\x1b[0m below configured minimum of {} wei",
                        config.min_native_balance
                    );
                }
            }
            Err(e) => {
                println!("\x1b[31mFAILED\x1b[0m");
                println!("    Error: {}", e);
                return Err(RelayerError::Server(format!("RPC check failed: {e}")));
            }
        }
    }

    println!();
    Ok(())
}

fn print_summary(settings: &Settings, config: &RelayerConfig) {
    println!("    Hot wallet: {}", config.hot_wallet);
    println!(
        "    RPC host: {}",
        config.rpc_url.host_str().unwrap_or("unknown")
    );
    if let Some(chain_id) = config.chain_id {
        println!("    Chain id: {}", chain_id);
    }

    match &config.strategy {
        StrategyConfig::TokenTransfer {
            token,
            decimals,
            amount,
            base_units,
        } => {
            println!("    Mode: token_transfer");
            println!("    Token: {} ({} decimals)", token, decimals);
            println!("    Amount per claim: {} ({} base units)", amount, base_units);
        }
        StrategyConfig::ContractClaim { contract } => {
            println!("    Mode: contract_claim");
            println!("    Claim contract: {}", contract);
        }
    }

    println!(
        "    Confirmation: {} block(s), timeout {}s",
        config.confirmation.confirmations, config.confirmation.timeout_secs
    );
    println!(
        "    Listening on: {}:{}{}",
        settings.server.host, settings.server.port, settings.server.claim_path
    );
    if settings.response.expose_diagnostics {
        println!("    \x1b[33mDiagnostics exposed in error responses\x1b[0m");
    }
}
