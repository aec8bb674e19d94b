//! Diagnostic CLI for the two-way peg client

use clap::Parser;
use pegbtc_client::cli::args::{Cli, Commands};
use pegbtc_client::cli::commands;
use pegbtc_client::client::PegClient;
use pegbtc_client::config::{BitcoinNetwork, Context, SolanaNetwork};
use std::process;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let bitcoin_network: BitcoinNetwork = cli.bitcoin_network.parse()?;
    let solana_network: SolanaNetwork = cli.solana_network.parse()?;

    let mut context = Context::new(bitcoin_network, solana_network)?;
    if let Some(url) = cli.solana_rpc_url {
        context = context.with_solana_rpc_url(url);
    }
    let client = PegClient::new(context);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Utxos { address, spendable } => {
                commands::utxos(&client, address, spendable).await?
            }
            Commands::Price { symbol } => commands::price(&client, symbol).await?,
            Commands::Reserves => commands::reserves(&client).await?,
            Commands::Interactions {
                solana_address,
                size,
            } => commands::interactions(&client, solana_address, size).await?,
            Commands::Claim { address } => commands::claim(&client, address).await?,
        }
        Ok(())
    })
}
