//! Client-side bindings for the two-way-peg and liquidity-management
//! programs
//!
//! Program ids are not compiled in: a bootstrap account per network pair
//! holds them, read once and memoized. Account layouts are borsh-encoded
//! behind an 8-byte discriminator; PDAs are derived with the canonical
//! seeds in [`pdas`].

pub mod accounts;
pub mod instructions;
pub mod pdas;

pub use accounts::{
    EntityDerivedReserve, EntityDerivedReserveAddress, ReserveBootstrap, TwoWayPegConfiguration,
    ZplAccounts,
};

use std::str::FromStr;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tokio::sync::OnceCell;

use crate::config::Context;
use crate::ledger::{Ledger, LedgerError};

/// Errors from program-binding reads and instruction building
#[derive(Debug, thiserror::Error)]
pub enum ZplError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid account address: {0}")]
    InvalidAddress(String),

    #[error("Account data did not match the expected layout: {0}")]
    Layout(String),

    #[error("Bootstrap account not found")]
    BootstrapNotFound,

    #[error("Configuration account not found")]
    ConfigurationNotFound,

    #[error("Instruction encoding failed: {0}")]
    Encoding(String),
}

/// Parse a base58 account address
pub(crate) fn parse_pubkey(address: &str) -> Result<Pubkey, ZplError> {
    Pubkey::from_str(address).map_err(|_| ZplError::InvalidAddress(address.to_string()))
}

/// Lazily-bootstrapped program bindings shared by the models
pub struct ZplProgram {
    ledger: Arc<dyn Ledger>,
    bootstrap_program_address: &'static str,
    bootstrap_reserve_setting_address: &'static str,
    accounts: OnceCell<ZplAccounts>,
    reserve: OnceCell<ReserveBootstrap>,
}

impl ZplProgram {
    pub fn new(context: &Context, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            bootstrap_program_address: context.bootstrap_program_address(),
            bootstrap_reserve_setting_address: context.bootstrap_reserve_setting_address(),
            accounts: OnceCell::new(),
            reserve: OnceCell::new(),
        }
    }

    /// Program ids from the bootstrap account, read once per process
    pub async fn accounts(&self) -> Result<&ZplAccounts, ZplError> {
        self.accounts
            .get_or_try_init(|| async {
                let program = parse_pubkey(self.bootstrap_program_address)?;
                let bootstrap = self.ledger.get_program_accounts(&program).await?;
                let (_, data) = bootstrap.first().ok_or(ZplError::BootstrapNotFound)?;
                ZplAccounts::parse(data)
            })
            .await
    }

    /// Bootstrap reserve-setting account, read once per process
    pub async fn reserve_setting(&self) -> Result<&ReserveBootstrap, ZplError> {
        self.reserve
            .get_or_try_init(|| async {
                let address = parse_pubkey(self.bootstrap_reserve_setting_address)?;
                let data = self
                    .ledger
                    .get_account_data(&address)
                    .await?
                    .ok_or(ZplError::BootstrapNotFound)?;
                ReserveBootstrap::parse(&data)
            })
            .await
    }

    /// Current two-way-peg configuration (fee collector, miner fee rate)
    pub async fn configuration(&self) -> Result<TwoWayPegConfiguration, ZplError> {
        let accounts = self.accounts().await?;
        let pda = pdas::derive_configuration(&accounts.two_way_peg_program);
        let data = self
            .ledger
            .get_account_data(&pda)
            .await?
            .ok_or(ZplError::ConfigurationNotFound)?;
        TwoWayPegConfiguration::parse(&data)
    }

    /// Entity-derived reserve addresses provisioned for a wallet
    pub async fn find_entity_derived_reserve_addresses(
        &self,
        solana_owner: &Pubkey,
    ) -> Result<Vec<EntityDerivedReserveAddress>, ZplError> {
        let accounts = self.accounts().await?;
        let scan = self
            .ledger
            .get_program_accounts(&accounts.two_way_peg_program)
            .await?;

        let mut found = Vec::new();
        for (pubkey, data) in scan {
            if let Some(edra) = EntityDerivedReserveAddress::try_parse(pubkey, &data) {
                if edra.solana_owner == *solana_owner {
                    found.push(edra);
                }
            }
        }
        Ok(found)
    }

    /// All entity-derived reserves registered with the peg program
    pub async fn find_entity_derived_reserves(
        &self,
    ) -> Result<Vec<EntityDerivedReserve>, ZplError> {
        let accounts = self.accounts().await?;
        let scan = self
            .ledger
            .get_program_accounts(&accounts.two_way_peg_program)
            .await?;

        Ok(scan
            .into_iter()
            .filter_map(|(pubkey, data)| EntityDerivedReserve::try_parse(pubkey, &data))
            .collect())
    }
}
