//! CLI argument definitions using clap

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pegbtc",
    version,
    about = "Diagnostic client for the Bitcoin/Solana two-way peg",
    long_about = None
)]
pub struct Cli {
    /// Bitcoin network: mainnet, testnet, regtest
    #[arg(long, global = true, default_value = "regtest")]
    pub bitcoin_network: String,

    /// Solana network: mainnet, devnet, testnet
    #[arg(long, global = true, default_value = "devnet")]
    pub solana_network: String,

    /// Solana RPC endpoint (overrides the network default)
    #[arg(long, global = true)]
    pub solana_rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List an address's UTXOs with ordinal/blocked annotations
    Utxos {
        /// Bitcoin address to query
        #[arg(long)]
        address: String,

        /// Show only spendable UTXOs (non-ordinal, not blocked)
        #[arg(long)]
        spendable: bool,
    },

    /// Show the latest ticker price for a symbol
    Price {
        /// Trading symbol (default: BTCUSDT)
        #[arg(long, default_value = "BTCUSDT")]
        symbol: String,
    },

    /// List usable reserves and their remaining withdrawal quota
    Reserves,

    /// Show recent interactions for a Solana address
    Interactions {
        /// Solana address to query
        #[arg(long)]
        solana_address: String,

        /// Number of interactions to show (default: 10)
        #[arg(long, default_value = "10")]
        size: usize,
    },

    /// Claim test bitcoin from the faucet (non-mainnet networks only)
    Claim {
        /// Taproot address to fund
        #[arg(long)]
        address: String,
    },
}
