//! Wallet signer seams
//!
//! The deposit and withdrawal services never hold keys; they talk to a
//! connected wallet through these traits. An unauthenticated wallet
//! surfaces as `None` from the accessor methods and the services fail
//! before doing any work.

use async_trait::async_trait;
use bitcoin::Psbt;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::{v0, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;

/// Errors from wallet interactions
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction compilation failed: {0}")]
    Compile(String),
}

/// Compile instructions into an unsigned v0 transaction for the payer
pub fn compile_transaction(
    payer: &Pubkey,
    instructions: &[Instruction],
    blockhash: Hash,
) -> Result<VersionedTransaction, SignerError> {
    let message = v0::Message::try_compile(payer, instructions, &[], blockhash)
        .map_err(|e| SignerError::Compile(e.to_string()))?;
    Ok(VersionedTransaction {
        signatures: vec![Signature::default()],
        message: VersionedMessage::V0(message),
    })
}

/// A connected Solana wallet able to sign versioned transactions
#[async_trait]
pub trait SolanaSigner: Send + Sync {
    /// Public key of the connected wallet, `None` when not connected
    fn pubkey(&self) -> Option<Pubkey>;

    /// Sign a compiled transaction with the wallet's key
    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, SignerError>;
}

/// A connected Bitcoin wallet able to sign taproot PSBTs
#[async_trait]
pub trait BitcoinSigner: Send + Sync {
    /// Hex-encoded public key of the connected wallet
    fn public_key(&self) -> Option<String>;

    /// Receiving address of the connected wallet
    fn address(&self) -> Option<String>;

    /// Sign and finalize a PSBT; returns the raw transaction hex
    async fn sign_psbt(&self, psbt: Psbt) -> Result<String, SignerError>;
}

// In-process keypairs double as signers, used by the CLI and tests.
#[async_trait]
impl SolanaSigner for Keypair {
    fn pubkey(&self) -> Option<Pubkey> {
        Some(Signer::pubkey(self))
    }

    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, SignerError> {
        VersionedTransaction::try_new(transaction.message, &[self])
            .map_err(|e| SignerError::Signing(e.to_string()))
    }
}
