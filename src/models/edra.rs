//! Entity-derived reserve addresses
//!
//! Every depositor gets a dedicated taproot deposit address provisioned
//! under one reserve. Lookup is an account scan; provisioning picks an
//! eligible reserve (by emission escrow utilization, rotated daily) and
//! submits the create instruction.

use std::sync::Arc;

use chrono::NaiveDate;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::address::{p2tr_address_from_output_key, AddressError, BitcoinAddressType};
use crate::clients::{ClientError, LayerIndexer};
use crate::config::Context;
use crate::ledger::{Ledger, LedgerError};
use crate::models::reserve::ReserveSettingModel;
use crate::signer::{compile_transaction, SignerError, SolanaSigner};
use crate::units::satoshi_to_btc;
use crate::zpl::{instructions, parse_pubkey, EntityDerivedReserveAddress, ZplError, ZplProgram};

/// Reserves whose remaining emission quota share is at or above this are
/// skipped during provisioning
const REMAINING_QUOTA_SHARE_THRESHOLD: f64 = 0.9;

/// Divisor applied to the emission escrow when sizing a reserve's max
/// locked amount
const SAFETY_RATIO: f64 = 20_000.0;

/// Day zero of the daily reserve rotation
const ROTATION_EPOCH: (i32, u32, u32) = (2025, 3, 28);

/// Errors from deposit-address provisioning
#[derive(Debug, thiserror::Error)]
pub enum AccountCreationError {
    #[error("Wallet error: {0}")]
    Signer(#[from] SignerError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Program error: {0}")]
    Zpl(#[from] ZplError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("No suitable reserve found after quota filtering")]
    NoEligibleReserve,

    #[error("Entity-derived reserve not found for the selected reserve setting")]
    ReserveNotRegistered,
}

pub struct EdraModel {
    ledger: Arc<dyn Ledger>,
    zpl: Arc<ZplProgram>,
    indexer: Arc<dyn LayerIndexer>,
    reserves: Arc<ReserveSettingModel>,
    bitcoin_network: bitcoin::Network,
}

impl EdraModel {
    pub fn new(
        context: &Context,
        ledger: Arc<dyn Ledger>,
        zpl: Arc<ZplProgram>,
        indexer: Arc<dyn LayerIndexer>,
        reserves: Arc<ReserveSettingModel>,
    ) -> Self {
        Self {
            ledger,
            zpl,
            indexer,
            reserves,
            bitcoin_network: context.bitcoin_network().to_bitcoin(),
        }
    }

    /// Deposit address records provisioned for a wallet.
    ///
    /// Lookup failures degrade to an empty list; callers treat "none" and
    /// "unknown" the same way.
    pub async fn find_many(&self, solana_owner: &Pubkey) -> Vec<EntityDerivedReserveAddress> {
        match self
            .zpl
            .find_entity_derived_reserve_addresses(solana_owner)
            .await
        {
            Ok(list) => list,
            Err(e) => {
                log::debug!("entity-derived reserve address lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Taproot deposit address encoded from a record's output key
    pub fn p2tr_address(
        &self,
        edra: &EntityDerivedReserveAddress,
    ) -> Result<String, AddressError> {
        p2tr_address_from_output_key(&edra.address, self.bitcoin_network)
    }

    /// Provision a deposit address for the signer's wallet.
    ///
    /// Reserve choice: score each usable reserve by how much of its
    /// emission-escrow-derived cap is still unlocked, keep those below the
    /// utilization threshold, and rotate through the survivors by day.
    pub async fn create(&self, signer: &dyn SolanaSigner) -> Result<Signature, AccountCreationError> {
        let payer = signer.pubkey().ok_or(SignerError::NotConnected)?;

        let reserve_settings = self.reserves.find_many().await?;
        let emission_settings = self.indexer.get_emission_settings().await?;

        let mut eligible = Vec::new();
        for setting in &reserve_settings {
            let escrow_balance = emission_settings
                .iter()
                .find(|emission| emission.guardian_certificate == setting.guardian_certificate)
                .map(|emission| emission.escrow_balance)
                .unwrap_or(0);

            let max_btc = satoshi_to_btc(escrow_balance) / SAFETY_RATIO;
            let remaining_btc = max_btc - satoshi_to_btc(setting.total_amount_locked);
            let remaining_share = remaining_btc / max_btc;

            if remaining_share < REMAINING_QUOTA_SHARE_THRESHOLD {
                eligible.push(setting);
            }
        }

        if eligible.is_empty() {
            return Err(AccountCreationError::NoEligibleReserve);
        }

        let selected = eligible[self.rotation_index(eligible.len())];
        let selected_address = parse_pubkey(&selected.address)?;

        let reserves = self.zpl.find_entity_derived_reserves().await?;
        let entity_derived_reserve = reserves
            .iter()
            .find(|edr| edr.reserve_setting == selected_address)
            .ok_or(AccountCreationError::ReserveNotRegistered)?;

        let accounts = self.zpl.accounts().await?;
        let configuration = self.zpl.configuration().await?;

        let instruction = instructions::build_create_entity_derived_reserve_address_ix(
            &accounts.two_way_peg_program,
            &payer,
            &selected_address,
            &parse_pubkey(&selected.guardian_certificate)?,
            &configuration.layer_fee_collector,
            &entity_derived_reserve.pubkey,
            BitcoinAddressType::P2tr.code(),
        )?;

        let blockhash = self.ledger.latest_blockhash().await?;
        let transaction = compile_transaction(&payer, &[instruction], blockhash)?;
        let signed = signer.sign_transaction(transaction).await?;
        Ok(self.ledger.send_transaction(&signed).await?)
    }

    fn rotation_index(&self, candidates: usize) -> usize {
        let (year, month, day) = ROTATION_EPOCH;
        let epoch = NaiveDate::from_ymd_opt(year, month, day)
            .unwrap_or(NaiveDate::MIN);
        let elapsed_days = chrono::Utc::now()
            .date_naive()
            .signed_duration_since(epoch)
            .num_days()
            .max(0) as usize;
        elapsed_days % candidates
    }
}
