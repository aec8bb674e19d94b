//! Top-level client facade
//!
//! Wires the remote clients, models, and services together from one
//! validated [`Context`]. All dependencies flow through constructors;
//! swapping the ledger (or any client trait) swaps it everywhere.

use std::sync::Arc;

use crate::cache::Cache;
use crate::clients::{
    BitcoinGateway, FaucetClient, GatewayClient, LayerIndexer, LayerIndexerClient, OrdinalIndex,
    OrdinalsClient, TickerClient,
};
use crate::config::Context;
use crate::deposit::DepositService;
use crate::ledger::{Ledger, RpcLedger};
use crate::models::interaction::INTERACTION_CACHE;
use crate::models::utxo::BLOCKED_UTXO_CACHE;
use crate::models::{EdraModel, InteractionModel, ReserveSettingModel, UtxoModel};
use crate::withdraw::WithdrawService;
use crate::zpl::ZplProgram;

/// The assembled client: models and services sharing one context
pub struct PegClient {
    context: Context,
    utxos: Arc<UtxoModel>,
    reserves: Arc<ReserveSettingModel>,
    interactions: Arc<InteractionModel>,
    edra: Arc<EdraModel>,
    deposit: DepositService,
    withdraw: WithdrawService,
    ticker: TickerClient,
    faucet: FaucetClient,
}

impl PegClient {
    /// Assemble a client against the real remote services
    pub fn new(context: Context) -> Self {
        let ledger: Arc<dyn Ledger> = Arc::new(RpcLedger::new(&context));
        Self::with_ledger(context, ledger)
    }

    /// Assemble a client with a caller-supplied ledger implementation
    pub fn with_ledger(context: Context, ledger: Arc<dyn Ledger>) -> Self {
        let gateway: Arc<dyn BitcoinGateway> = Arc::new(GatewayClient::new(&context));
        let ordinals: Arc<dyn OrdinalIndex> = Arc::new(OrdinalsClient::new());
        let indexer: Arc<dyn LayerIndexer> = Arc::new(LayerIndexerClient::new(&context));
        let zpl = Arc::new(ZplProgram::new(&context, Arc::clone(&ledger)));

        let utxos = Arc::new(UtxoModel::new(
            Arc::clone(&gateway),
            ordinals,
            Cache::persistent(BLOCKED_UTXO_CACHE),
        ));
        let reserves = Arc::new(ReserveSettingModel::new(
            &context,
            Arc::clone(&indexer),
            Arc::clone(&ledger),
            Arc::clone(&zpl),
        ));
        let interactions = Arc::new(InteractionModel::new(
            Arc::clone(&indexer),
            Arc::clone(&zpl),
            Cache::persistent(INTERACTION_CACHE),
        ));
        let edra = Arc::new(EdraModel::new(
            &context,
            Arc::clone(&ledger),
            Arc::clone(&zpl),
            Arc::clone(&indexer),
            Arc::clone(&reserves),
        ));
        let deposit = DepositService::new(
            &context,
            Arc::clone(&gateway),
            Arc::clone(&utxos),
            Arc::clone(&edra),
            Arc::clone(&interactions),
            Arc::clone(&zpl),
        );
        let withdraw = WithdrawService::new(
            &context,
            Arc::clone(&ledger),
            Arc::clone(&zpl),
            Arc::clone(&reserves),
        );
        let ticker = TickerClient::new();
        let faucet = FaucetClient::new(&context);

        Self {
            context,
            utxos,
            reserves,
            interactions,
            edra,
            deposit,
            withdraw,
            ticker,
            faucet,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn utxos(&self) -> &UtxoModel {
        &self.utxos
    }

    pub fn reserves(&self) -> &ReserveSettingModel {
        &self.reserves
    }

    pub fn interactions(&self) -> &InteractionModel {
        &self.interactions
    }

    pub fn edra(&self) -> &EdraModel {
        &self.edra
    }

    pub fn deposit(&self) -> &DepositService {
        &self.deposit
    }

    pub fn withdraw(&self) -> &WithdrawService {
        &self.withdraw
    }

    pub fn ticker(&self) -> &TickerClient {
        &self.ticker
    }

    pub fn faucet(&self) -> &FaucetClient {
        &self.faucet
    }
}
