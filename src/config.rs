//! Network configuration for the two-way peg client
//!
//! Every remote client and program binding is constructed from a validated
//! [`Context`]: a `(BitcoinNetwork, SolanaNetwork)` pair from a small
//! allowlist, plus the reserve policy and service endpoints that pair
//! implies. Constructing a `Context` performs no I/O; an unsupported pair
//! fails before any network call can happen.

use serde::{Deserialize, Serialize};

/// Bitcoin network selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    /// Serialized as "bitcoin" to match the wire form used by the indexers
    #[serde(rename = "bitcoin")]
    Mainnet,
    Testnet,
    Regtest,
}

/// Solana network selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolanaNetwork {
    Mainnet,
    Devnet,
    Testnet,
}

impl std::fmt::Display for BitcoinNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitcoinNetwork::Mainnet => write!(f, "bitcoin"),
            BitcoinNetwork::Testnet => write!(f, "testnet"),
            BitcoinNetwork::Regtest => write!(f, "regtest"),
        }
    }
}

impl std::fmt::Display for SolanaNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolanaNetwork::Mainnet => write!(f, "mainnet"),
            SolanaNetwork::Devnet => write!(f, "devnet"),
            SolanaNetwork::Testnet => write!(f, "testnet"),
        }
    }
}

impl std::str::FromStr for BitcoinNetwork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "mainnet" => Ok(BitcoinNetwork::Mainnet),
            "testnet" => Ok(BitcoinNetwork::Testnet),
            "regtest" => Ok(BitcoinNetwork::Regtest),
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

impl std::str::FromStr for SolanaNetwork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(SolanaNetwork::Mainnet),
            "devnet" => Ok(SolanaNetwork::Devnet),
            "testnet" => Ok(SolanaNetwork::Testnet),
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

impl BitcoinNetwork {
    /// Corresponding `bitcoin` crate network
    pub fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            BitcoinNetwork::Mainnet => bitcoin::Network::Bitcoin,
            BitcoinNetwork::Testnet => bitcoin::Network::Testnet,
            BitcoinNetwork::Regtest => bitcoin::Network::Regtest,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Unsupported network configuration: Bitcoin \"{bitcoin}\" and Solana \"{solana}\"")]
    UnsupportedNetworkPair {
        bitcoin: BitcoinNetwork,
        solana: SolanaNetwork,
    },
}

/// Reserve filtering and quota policy, keyed by reserve address strings.
///
/// The defaults reproduce the production policy: on non-mainnet networks
/// only the playground reserve is usable, on mainnet the externally
/// custodied reserves are excluded, and one reserve carries an
/// external-reserve offset that is not withdrawable through this path.
#[derive(Debug, Clone)]
pub struct ReservePolicy {
    /// The single reserve exposed on non-mainnet networks
    pub playground_reserve: String,

    /// Reserves excluded from withdrawal on mainnet
    pub excluded_reserves: Vec<String>,

    /// Per-reserve amounts (in satoshi) held in external custody and
    /// subtracted from that reserve's store quota
    pub external_reserve_offsets: Vec<(String, u64)>,
}

impl Default for ReservePolicy {
    fn default() -> Self {
        Self {
            playground_reserve: "7hDRd3Y4X7U7BQ6ZPeLwVtjMY7hChdq1N6xdpv59QEdU".to_string(),
            excluded_reserves: vec![
                "qfwSyZGUcoNLiEwBWy3xNdNdV6z4o7c5UySXsUngA94".to_string(),
                "E7qaFxt5evLDdRcu79kMXZXV1Peyt9q6kMwRV4BLyA9d".to_string(),
                "6ZHTBozu5Yr7E8zyF87XcyqkA932KaeDWwhL4NW4GzTe".to_string(),
            ],
            external_reserve_offsets: vec![(
                "B8eCvQSjAtDCXc59fWZo4aL6w9KfSKwr9KXkotSkDDSg".to_string(),
                // 80 BTC held in external custody
                80 * 100_000_000,
            )],
        }
    }
}

impl ReservePolicy {
    /// External-custody offset for a reserve address, if configured
    pub fn external_offset(&self, address: &str) -> Option<u64> {
        self.external_reserve_offsets
            .iter()
            .find(|(a, _)| a == address)
            .map(|(_, amount)| *amount)
    }
}

/// Validated client context: network pair, endpoints, and policy
#[derive(Debug, Clone)]
pub struct Context {
    bitcoin_network: BitcoinNetwork,
    solana_network: SolanaNetwork,
    solana_rpc_url: String,
    reserve_policy: ReservePolicy,
    strict_allocation: bool,
}

impl Context {
    /// Validate a network pair and build the client context.
    ///
    /// Supported pairs: mainnet+mainnet, testnet+devnet, regtest+devnet.
    /// Any other combination fails with [`ConfigError::UnsupportedNetworkPair`]
    /// before any network call is made.
    pub fn new(
        bitcoin_network: BitcoinNetwork,
        solana_network: SolanaNetwork,
    ) -> Result<Self, ConfigError> {
        match (bitcoin_network, solana_network) {
            (BitcoinNetwork::Mainnet, SolanaNetwork::Mainnet)
            | (BitcoinNetwork::Testnet, SolanaNetwork::Devnet)
            | (BitcoinNetwork::Regtest, SolanaNetwork::Devnet) => {}
            _ => {
                return Err(ConfigError::UnsupportedNetworkPair {
                    bitcoin: bitcoin_network,
                    solana: solana_network,
                })
            }
        }

        Ok(Self {
            bitcoin_network,
            solana_network,
            solana_rpc_url: default_solana_rpc_url(solana_network).to_string(),
            reserve_policy: ReservePolicy::default(),
            strict_allocation: false,
        })
    }

    /// Override the Solana RPC endpoint
    pub fn with_solana_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.solana_rpc_url = url.into();
        self
    }

    /// Override the reserve policy
    pub fn with_reserve_policy(mut self, policy: ReservePolicy) -> Self {
        self.reserve_policy = policy;
        self
    }

    /// Reject withdrawals that exceed the combined reserve quota instead of
    /// silently submitting a partial allocation
    pub fn with_strict_allocation(mut self, strict: bool) -> Self {
        self.strict_allocation = strict;
        self
    }

    pub fn bitcoin_network(&self) -> BitcoinNetwork {
        self.bitcoin_network
    }

    pub fn solana_network(&self) -> SolanaNetwork {
        self.solana_network
    }

    pub fn solana_rpc_url(&self) -> &str {
        &self.solana_rpc_url
    }

    pub fn reserve_policy(&self) -> &ReservePolicy {
        &self.reserve_policy
    }

    pub fn strict_allocation(&self) -> bool {
        self.strict_allocation
    }

    /// Base URL of the UTXO/transaction indexer
    pub fn gateway_base_url(&self) -> &'static str {
        match self.bitcoin_network {
            BitcoinNetwork::Mainnet => "https://bitcoin-api-gateway.zeuslayer.io",
            BitcoinNetwork::Testnet => "https://bitcoin-api-gateway-testnet3-devnet.zeuslayer.space",
            BitcoinNetwork::Regtest => "https://bitcoin-api-gateway-regtest-devnet.zeuslayer.space",
        }
    }

    /// Base URL of the interaction/guardian-settings indexer
    pub fn indexer_base_url(&self) -> &'static str {
        match self.bitcoin_network {
            BitcoinNetwork::Mainnet => "https://indexer.zeuslayer.io/api",
            _ => "https://indexer-regtest-devnet.zeuslayer.space/api",
        }
    }

    /// Base URL of the testnet claim faucet
    pub fn faucet_base_url(&self) -> &'static str {
        match self.bitcoin_network {
            BitcoinNetwork::Mainnet => "https://api-internal.apollobyzeus.app",
            BitcoinNetwork::Testnet => "https://api-testnet3-devnet.apollobyzeus.space",
            BitcoinNetwork::Regtest => "https://api-regtest-devnet.apollobyzeus.space",
        }
    }

    /// Address of the bootstrap account holding the peg program ids
    pub fn bootstrap_program_address(&self) -> &'static str {
        match self.bitcoin_network {
            BitcoinNetwork::Mainnet => "5ogaABGMX57MA44bfTXe3ia1XNxAFitqDEibg9xYkX35",
            BitcoinNetwork::Testnet => "A2pkuynEoU2yhnGBDVkSkKNLGvtDjj94tSqfPx3XPhiP",
            BitcoinNetwork::Regtest => "DTZeCgdDLz6gS6e3K4Go4WGh7sLLj9ux9BF2pPym7MD8",
        }
    }

    /// Address of the bootstrap reserve-setting account
    pub fn bootstrap_reserve_setting_address(&self) -> &'static str {
        match self.bitcoin_network {
            BitcoinNetwork::Mainnet => "AFbCrUqgiyLpnBbybYGw8QJjqLWk5p4SNvo6tFRQftKL",
            _ => "7hDRd3Y4X7U7BQ6ZPeLwVtjMY7hChdq1N6xdpv59QEdU",
        }
    }
}

/// Default public RPC endpoint for a Solana network
pub fn default_solana_rpc_url(network: SolanaNetwork) -> &'static str {
    match network {
        SolanaNetwork::Mainnet => "https://api.mainnet-beta.solana.com",
        SolanaNetwork::Devnet => "https://api.devnet.solana.com",
        SolanaNetwork::Testnet => "https://api.testnet.solana.com",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_pairs_validate() {
        assert!(Context::new(BitcoinNetwork::Mainnet, SolanaNetwork::Mainnet).is_ok());
        assert!(Context::new(BitcoinNetwork::Testnet, SolanaNetwork::Devnet).is_ok());
        assert!(Context::new(BitcoinNetwork::Regtest, SolanaNetwork::Devnet).is_ok());
    }

    #[test]
    fn unsupported_pairs_fail_fast() {
        for (b, s) in [
            (BitcoinNetwork::Mainnet, SolanaNetwork::Devnet),
            (BitcoinNetwork::Regtest, SolanaNetwork::Mainnet),
            (BitcoinNetwork::Testnet, SolanaNetwork::Testnet),
        ] {
            match Context::new(b, s) {
                Err(ConfigError::UnsupportedNetworkPair { bitcoin, solana }) => {
                    assert_eq!(bitcoin, b);
                    assert_eq!(solana, s);
                }
                other => panic!("expected UnsupportedNetworkPair, got {:?}", other),
            }
        }
    }

    #[test]
    fn mainnet_serializes_as_bitcoin() {
        let json = serde_json::to_string(&BitcoinNetwork::Mainnet).unwrap();
        assert_eq!(json, "\"bitcoin\"");
        let back: BitcoinNetwork = serde_json::from_str("\"bitcoin\"").unwrap();
        assert_eq!(back, BitcoinNetwork::Mainnet);
    }

    #[test]
    fn external_offset_lookup() {
        let policy = ReservePolicy::default();
        assert_eq!(
            policy.external_offset("B8eCvQSjAtDCXc59fWZo4aL6w9KfSKwr9KXkotSkDDSg"),
            Some(8_000_000_000)
        );
        assert_eq!(policy.external_offset("unknown"), None);
    }
}
