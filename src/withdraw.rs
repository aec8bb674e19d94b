//! Withdrawal service
//!
//! A withdrawal spends wrapped-token balance back to a bitcoin address.
//! The requested amount is spread greedily across the reserves with the
//! most remaining quota; each reserve touched contributes an instruction
//! pair (store + add-withdrawal-request) to a single transaction.

use std::sync::Arc;

use futures::future::join_all;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use crate::address::{receiver_address_bytes, AddressError};
use crate::clients::ClientError;
use crate::config::Context;
use crate::ledger::{Ledger, LedgerError};
use crate::models::reserve::ReserveSettingModel;
use crate::signer::{compile_transaction, SignerError, SolanaSigner};
use crate::types::ReserveSetting;
use crate::units::{btc_to_satoshi, infrastructure_fee_sol, lamports_to_sol};
use crate::zpl::{instructions, parse_pubkey, ZplError, ZplProgram};

/// Errors from the withdrawal flow, wrapping the failing step's cause
#[derive(Debug, thiserror::Error)]
pub enum WithdrawError {
    #[error("Wallet error: {0}")]
    Signer(#[from] SignerError),

    #[error("Insufficient SOL balance. Required: {required} SOL, Available: {available} SOL")]
    InsufficientSolBalance { required: f64, available: f64 },

    #[error(
        "Requested amount exceeds the combined reserve quota: requested {requested} sats, available {available} sats"
    )]
    InsufficientQuota { requested: u64, available: u64 },

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Program error: {0}")]
    Zpl(#[from] ZplError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),
}

/// A withdrawal request in display units
#[derive(Debug, Clone)]
pub struct WithdrawRequest {
    /// Receiving bitcoin address
    pub bitcoin_address: String,

    /// Amount to withdraw, in BTC
    pub amount_btc: f64,
}

/// One reserve's share of a withdrawal
#[derive(Debug, Clone)]
pub struct Allocation {
    pub reserve: ReserveSetting,
    pub amount_satoshi: u64,
}

/// Greedily allocate a requested amount across reserves.
///
/// Reserves are visited in descending remaining-quota order (ties broken
/// by reserve address so the plan is deterministic); each contributes
/// `min(quota, remaining)` until the request is covered. Reserves with
/// nothing to contribute are skipped. When the combined quota falls short
/// the plan simply covers what it can; the caller decides whether that is
/// an error.
pub fn allocate(amount_satoshi: u64, reserves: Vec<(u64, ReserveSetting)>) -> Vec<Allocation> {
    let mut reserves = reserves;
    reserves.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.address.cmp(&b.1.address)));

    let mut remaining = amount_satoshi;
    let mut plan = Vec::new();
    for (quota, reserve) in reserves {
        if remaining == 0 {
            break;
        }
        let amount = quota.min(remaining);
        if amount > 0 {
            remaining -= amount;
            plan.push(Allocation {
                reserve,
                amount_satoshi: amount,
            });
        }
    }
    plan
}

pub struct WithdrawService {
    ledger: Arc<dyn Ledger>,
    zpl: Arc<ZplProgram>,
    reserves: Arc<ReserveSettingModel>,
    strict_allocation: bool,
}

impl WithdrawService {
    pub fn new(
        context: &Context,
        ledger: Arc<dyn Ledger>,
        zpl: Arc<ZplProgram>,
        reserves: Arc<ReserveSettingModel>,
    ) -> Self {
        Self {
            ledger,
            zpl,
            reserves,
            strict_allocation: context.strict_allocation(),
        }
    }

    /// Build, sign, and submit a withdrawal transaction.
    ///
    /// Quotas for all usable reserves are computed concurrently, the
    /// request is allocated across them, and one transaction carrying
    /// every instruction pair is signed by the wallet and submitted.
    /// Returns the submission signature.
    pub async fn sign_withdraw(
        &self,
        signer: &dyn SolanaSigner,
        request: &WithdrawRequest,
    ) -> Result<Signature, WithdrawError> {
        let payer = signer.pubkey().ok_or(SignerError::NotConnected)?;

        let balance = lamports_to_sol(self.ledger.get_balance(&payer).await?);
        let required = infrastructure_fee_sol(request.amount_btc);
        if balance < required {
            return Err(WithdrawError::InsufficientSolBalance {
                required,
                available: balance,
            });
        }

        let amount_satoshi = btc_to_satoshi(request.amount_btc);

        let settings = self.reserves.find_many().await?;
        let quotas = join_all(
            settings
                .iter()
                .map(|setting| self.reserves.get_quota(setting)),
        )
        .await;

        let plan = allocate(amount_satoshi, quotas.into_iter().zip(settings).collect());

        if self.strict_allocation {
            let allocated: u64 = plan.iter().map(|allocation| allocation.amount_satoshi).sum();
            if allocated < amount_satoshi {
                return Err(WithdrawError::InsufficientQuota {
                    requested: amount_satoshi,
                    available: allocated,
                });
            }
        }

        let mut instruction_list = Vec::with_capacity(plan.len() * 2);
        for allocation in &plan {
            instruction_list.extend(
                self.create_withdraw_instructions(&payer, &request.bitcoin_address, allocation)
                    .await?,
            );
        }

        let blockhash = self.ledger.latest_blockhash().await?;
        let transaction = compile_transaction(&payer, &instruction_list, blockhash)?;
        let signed = signer.sign_transaction(transaction).await?;
        Ok(self.ledger.send_transaction(&signed).await?)
    }

    /// The store + add-withdrawal-request pair for one reserve
    async fn create_withdraw_instructions(
        &self,
        payer: &Pubkey,
        bitcoin_address: &str,
        allocation: &Allocation,
    ) -> Result<Vec<Instruction>, WithdrawError> {
        let (receiver_address, address_type) = receiver_address_bytes(bitcoin_address)?;

        let accounts = self.zpl.accounts().await?;
        let bootstrap = self.zpl.reserve_setting().await?;
        let configuration = self.zpl.configuration().await?;
        let reserve_setting = parse_pubkey(&allocation.reserve.address)?;

        let store = instructions::build_store_ix(
            &accounts.liquidity_management_program,
            allocation.amount_satoshi,
            payer,
            &bootstrap.asset_mint,
            &reserve_setting,
        )?;

        let withdrawal_request = instructions::build_add_withdrawal_request_ix(
            &accounts.two_way_peg_program,
            allocation.amount_satoshi,
            chrono::Utc::now().timestamp(),
            receiver_address,
            address_type.code(),
            payer,
            &configuration.layer_fee_collector,
            &reserve_setting,
            &accounts.liquidity_management_program,
        )?;

        Ok(vec![store, withdrawal_request])
    }
}
