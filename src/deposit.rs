//! Deposit service
//!
//! A deposit pays bitcoin into the wallet's entity-derived reserve
//! address. After the signed transaction is broadcast, a placeholder
//! interaction is cached for the UI and the consumed UTXOs are reserved
//! until the transaction confirms. Broadcast is the point of no return:
//! cache failures after it leave the transaction on the network.

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;

use crate::address::{classify, internal_xonly_pubkey, AddressError, BitcoinAddressType};
use crate::clients::{BitcoinGateway, ClientError};
use crate::config::Context;
use crate::models::edra::EdraModel;
use crate::models::interaction::{InteractionError, InteractionModel, NewDepositInteraction};
use crate::models::utxo::{FindUtxos, UtxoModel};
use crate::signer::{BitcoinSigner, SignerError};
use crate::txbuild::{build_deposit_transaction, TxBuildError};
use crate::units::btc_to_satoshi;
use crate::zpl::{ZplError, ZplProgram};

/// Errors from the deposit flow, wrapping the failing step's cause
#[derive(Debug, thiserror::Error)]
pub enum DepositError {
    #[error("Wallet error: {0}")]
    Signer(#[from] SignerError),

    #[error("Only Taproot (P2TR) bitcoin addresses are supported, got {0}")]
    UnsupportedAddressType(String),

    #[error("Reserve address not found")]
    ReserveAddressNotFound,

    #[error("No UTXOs available for deposit")]
    NoSpendableUtxos,

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Program error: {0}")]
    Zpl(#[from] ZplError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Transaction build error: {0}")]
    TxBuild(#[from] TxBuildError),

    #[error("Interaction error: {0}")]
    Interaction(#[from] InteractionError),
}

/// A deposit request in display units
#[derive(Debug, Clone)]
pub struct DepositRequest {
    /// Destination wallet on Solana
    pub solana_pubkey: Pubkey,

    /// Amount to deposit, in BTC
    pub amount_btc: f64,
}

pub struct DepositService {
    gateway: Arc<dyn BitcoinGateway>,
    utxos: Arc<UtxoModel>,
    edra: Arc<EdraModel>,
    interactions: Arc<InteractionModel>,
    zpl: Arc<ZplProgram>,
    bitcoin_network: bitcoin::Network,
}

impl DepositService {
    pub fn new(
        context: &Context,
        gateway: Arc<dyn BitcoinGateway>,
        utxos: Arc<UtxoModel>,
        edra: Arc<EdraModel>,
        interactions: Arc<InteractionModel>,
        zpl: Arc<ZplProgram>,
    ) -> Self {
        Self {
            gateway,
            utxos,
            edra,
            interactions,
            zpl,
            bitcoin_network: context.bitcoin_network().to_bitcoin(),
        }
    }

    /// Build, sign, and broadcast a deposit; returns the transaction id.
    ///
    /// The reserve deposit address, the network fee rate, and the
    /// spendable UTXO set are resolved concurrently before the
    /// transaction is built.
    pub async fn sign_and_broadcast_deposit(
        &self,
        signer: &dyn BitcoinSigner,
        request: &DepositRequest,
    ) -> Result<String, DepositError> {
        let public_key = signer.public_key().ok_or(SignerError::NotConnected)?;
        let bitcoin_address = signer.address().ok_or(SignerError::NotConnected)?;

        match classify(&bitcoin_address)? {
            BitcoinAddressType::P2tr => {}
            other => return Err(DepositError::UnsupportedAddressType(format!("{:?}", other))),
        }

        let spendable = FindUtxos {
            bitcoin_address: bitcoin_address.clone(),
            ordinal: Some(false),
            blocked: Some(false),
        };
        let (reserve_address, configuration, utxos) = tokio::try_join!(
            self.reserve_deposit_address(&request.solana_pubkey),
            async { Ok::<_, DepositError>(self.zpl.configuration().await?) },
            async { Ok::<_, DepositError>(self.utxos.find_many(&spendable).await?) },
        )?;

        let reserve_address = reserve_address.ok_or(DepositError::ReserveAddressNotFound)?;
        if utxos.is_empty() {
            return Err(DepositError::NoSpendableUtxos);
        }

        let internal_key = internal_xonly_pubkey(&public_key)?;
        let amount_satoshi = btc_to_satoshi(request.amount_btc);

        let (psbt, used_utxos) = build_deposit_transaction(
            &utxos,
            &reserve_address,
            amount_satoshi,
            internal_key,
            configuration.miner_fee_rate,
            self.bitcoin_network,
        )?;

        let transaction_hex = signer.sign_psbt(psbt).await?;
        let transaction_id = self.gateway.broadcast_transaction(&transaction_hex).await?;

        self.interactions
            .create_deposit_placeholder(NewDepositInteraction {
                transaction_id: transaction_id.clone(),
                bitcoin_pubkey: public_key,
                solana_address: request.solana_pubkey.to_string(),
                amount_satoshi,
            })
            .await?;

        self.utxos.block_utxos(&transaction_id, used_utxos);

        Ok(transaction_id)
    }

    /// First provisioned deposit address of the wallet, as a taproot
    /// address string
    async fn reserve_deposit_address(
        &self,
        solana_pubkey: &Pubkey,
    ) -> Result<Option<String>, DepositError> {
        let records = self.edra.find_many(solana_pubkey).await;
        match records.first() {
            Some(record) => Ok(Some(self.edra.p2tr_address(record)?)),
            None => Ok(None),
        }
    }
}
