//! Solana RPC access
//!
//! The models talk to the ledger through the [`Ledger`] trait so tests can
//! run against an in-memory fake; [`RpcLedger`] is the production
//! implementation over the nonblocking RPC client with confirmed
//! commitment.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;

use crate::config::Context;

/// Errors from ledger reads and submissions
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Malformed token amount: {0}")]
    InvalidTokenAmount(String),
}

/// Ledger operations needed by the models and services
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Lamport balance of an account
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, LedgerError>;

    /// Raw token balance of an SPL token account.
    ///
    /// Fails when the account does not exist or is not a token account;
    /// quota computation treats any failure as zero quota.
    async fn get_token_account_balance(&self, token_account: &Pubkey)
        -> Result<u64, LedgerError>;

    /// Most recent blockhash usable for a new transaction
    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Submit a signed transaction; returns its signature
    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError>;

    /// Raw account data, `None` when the account does not exist
    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError>;

    /// All accounts owned by a program, with their raw data
    async fn get_program_accounts(
        &self,
        program: &Pubkey,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError>;
}

/// Production [`Ledger`] over the Solana JSON-RPC API
pub struct RpcLedger {
    rpc: RpcClient,
}

impl RpcLedger {
    pub fn new(context: &Context) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(
                context.solana_rpc_url().to_string(),
                CommitmentConfig::confirmed(),
            ),
        }
    }

    /// Ledger against an explicit RPC endpoint
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(url.into(), CommitmentConfig::confirmed()),
        }
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, LedgerError> {
        Ok(self.rpc.get_balance(pubkey).await?)
    }

    async fn get_token_account_balance(
        &self,
        token_account: &Pubkey,
    ) -> Result<u64, LedgerError> {
        let amount = self.rpc.get_token_account_balance(token_account).await?;
        amount
            .amount
            .parse()
            .map_err(|_| LedgerError::InvalidTokenAmount(amount.amount))
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(CommitmentLevel::Confirmed),
            ..RpcSendTransactionConfig::default()
        };
        Ok(self
            .rpc
            .send_transaction_with_config(transaction, config)
            .await?)
    }

    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        let response = self
            .rpc
            .get_account_with_commitment(pubkey, CommitmentConfig::confirmed())
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_program_accounts(
        &self,
        program: &Pubkey,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError> {
        let accounts = self.rpc.get_program_accounts(program).await?;
        Ok(accounts
            .into_iter()
            .map(|(pubkey, account)| (pubkey, account.data))
            .collect())
    }
}
