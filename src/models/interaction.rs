//! Interaction bookkeeping
//!
//! The indexer is the authority on interaction history, but it lags a
//! freshly broadcast deposit by a block or two. A locally created
//! placeholder fills the gap: cached under the wallet's address, merged
//! into query results, and diffed out by id once the indexer catches up.

use std::sync::Arc;

use crate::address::{internal_xonly_pubkey_hex, AddressError};
use crate::cache::Cache;
use crate::clients::{ClientError, LayerIndexer};
use crate::types::{Chain, Interaction, InteractionStatus, InteractionStep, InteractionType};
use crate::units::{btc_to_satoshi, DEPOSIT_SERVICE_FEE_BTC};
use crate::zpl::{pdas, ZplError, ZplProgram};

/// Cache namespace for interaction placeholders
pub const INTERACTION_CACHE: &str = "interactions";

/// Client identifier recorded on placeholder interactions
const APP_DEVELOPER: &str = "PegBTC";

/// Errors from interaction bookkeeping
#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Program error: {0}")]
    Zpl(#[from] ZplError),

    #[error("Invalid transaction id: {0}")]
    InvalidTransactionId(#[from] hex::FromHexError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),
}

/// Inputs for a deposit placeholder
#[derive(Debug, Clone)]
pub struct NewDepositInteraction {
    /// Broadcast transaction id, hex
    pub transaction_id: String,

    /// Depositor's bitcoin public key, hex
    pub bitcoin_pubkey: String,

    /// Destination Solana address, base58
    pub solana_address: String,

    /// Deposit amount in satoshi
    pub amount_satoshi: u64,
}

pub struct InteractionModel {
    indexer: Arc<dyn LayerIndexer>,
    zpl: Arc<ZplProgram>,
    cache: Cache<Vec<Interaction>>,
}

impl InteractionModel {
    pub fn new(
        indexer: Arc<dyn LayerIndexer>,
        zpl: Arc<ZplProgram>,
        cache: Cache<Vec<Interaction>>,
    ) -> Self {
        Self {
            indexer,
            zpl,
            cache,
        }
    }

    /// Latest interactions for a wallet, newest first.
    ///
    /// Cached placeholders whose id now appears in the indexer's answer
    /// are dropped from the cache; the remainder is merged in ahead of
    /// the authoritative records.
    pub async fn find_many(
        &self,
        size: usize,
        solana_address: &str,
    ) -> Result<Vec<Interaction>, InteractionError> {
        let remote = self
            .indexer
            .find_many_interactions(size, solana_address)
            .await?;

        let cached = self.cache.get_or(solana_address, Vec::new());
        let pending: Vec<Interaction> = cached
            .iter()
            .filter(|placeholder| {
                !remote
                    .iter()
                    .any(|interaction| interaction.interaction_id == placeholder.interaction_id)
            })
            .cloned()
            .collect();

        if pending.len() != cached.len() {
            let replacement = if pending.is_empty() {
                None
            } else {
                Some(pending.clone())
            };
            self.cache.set(solana_address, replacement);
        }

        let mut merged = pending;
        merged.extend(remote);
        merged.sort_by(|a, b| b.initiated_at.cmp(&a.initiated_at));
        merged.truncate(size);
        Ok(merged)
    }

    /// Record a placeholder for a just-broadcast deposit so the UI can
    /// show it before the indexer has processed the transaction.
    pub async fn create_deposit_placeholder(
        &self,
        deposit: NewDepositInteraction,
    ) -> Result<Interaction, InteractionError> {
        let created_at = chrono::Utc::now().timestamp();
        let accounts = self.zpl.accounts().await?;

        let transaction_id_bytes = hex::decode(&deposit.transaction_id)?;
        let interaction_id = pdas::derive_interaction(
            &accounts.two_way_peg_program,
            &transaction_id_bytes,
            0,
        )
        .to_string();

        let interaction = Interaction {
            interaction_id,
            interaction_type: InteractionType::Deposit,
            status: InteractionStatus::BitcoinDepositToHotReserve,
            app_developer: APP_DEVELOPER.to_string(),
            initiated_at: created_at,
            current_step_at: Some(created_at),
            amount: deposit.amount_satoshi.to_string(),
            miner_fee: "0".to_string(),
            service_fee: btc_to_satoshi(DEPOSIT_SERVICE_FEE_BTC).to_string(),
            source: internal_xonly_pubkey_hex(&deposit.bitcoin_pubkey)?,
            destination: deposit.solana_address.clone(),
            guardian_certificate: None,
            guardian_setting: None,
            steps: Some(vec![InteractionStep {
                chain: Chain::Bitcoin,
                action: "DepositToEntityDerivedReserve".to_string(),
                transaction: deposit.transaction_id.clone(),
                timestamp: created_at,
            }]),
            swap_info: None,
            withdrawal_request_pda: None,
            deposit_block: None,
            liquidity_management_methods: None,
        };

        let mut cached = self.cache.get_or(&deposit.solana_address, Vec::new());
        cached.insert(0, interaction.clone());
        self.cache.set(&deposit.solana_address, Some(cached));

        Ok(interaction)
    }
}
