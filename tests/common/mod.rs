//! Shared in-memory fakes for integration tests
//!
//! Every remote dependency (gateway, ordinal indexer, layer indexer,
//! ledger) has a programmable fake here so the models and services run
//! without any network. Fakes record their calls for assertions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;

use pegbtc_client::clients::{BitcoinGateway, ClientError, LayerIndexer, OrdinalIndex};
use pegbtc_client::config::Context;
use pegbtc_client::ledger::{Ledger, LedgerError};
use pegbtc_client::types::{
    EmissionSetting, Interaction, InteractionStatus, InteractionType, OrdinalUtxo,
    OrdinalUtxoPage, RawUtxo, ReserveSetting, TransactionDetail,
};
use pegbtc_client::zpl::pdas;

// ---------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------

pub fn raw_utxo(txid_byte: u8, vout: u32, satoshis: u64) -> RawUtxo {
    RawUtxo {
        transaction_id: hex::encode([txid_byte; 32]),
        transaction_index: vout,
        satoshis,
        block_height: 800_000,
    }
}

pub fn reserve_setting(address: &str, pegged: u64) -> ReserveSetting {
    ReserveSetting {
        address: address.to_string(),
        seed: 0,
        guardian_certificate: format!("cert-{}", address),
        asset_mint: Pubkey::new_unique().to_string(),
        token_program_id: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".to_string(),
        spl_token_mint_authority: Pubkey::new_unique().to_string(),
        spl_token_burn_authority: Pubkey::new_unique().to_string(),
        total_amount_locked: pegged,
        total_amount_pegged: pegged,
        withdrawal_window: 86_400,
        withdrawal_window_started_at: 0,
        accumulated_withdrawal_amount: 0,
        max_reserve_withdrawal_quota: u64::MAX,
    }
}

pub fn interaction(id: &str, initiated_at: i64) -> Interaction {
    Interaction {
        interaction_id: id.to_string(),
        interaction_type: InteractionType::Deposit,
        status: InteractionStatus::BitcoinDepositToHotReserve,
        app_developer: "PegBTC".to_string(),
        initiated_at,
        current_step_at: Some(initiated_at),
        amount: "100000".to_string(),
        miner_fee: "0".to_string(),
        service_fee: "10000".to_string(),
        source: "deadbeef".to_string(),
        destination: "SolAddr".to_string(),
        guardian_certificate: None,
        guardian_setting: None,
        steps: None,
        swap_info: None,
        withdrawal_request_pda: None,
        deposit_block: None,
        liquidity_management_methods: None,
    }
}

pub fn unconfirmed_detail() -> TransactionDetail {
    TransactionDetail {
        transaction: "00".to_string(),
        blockhash: None,
        confirmations: None,
        time: None,
        blocktime: None,
    }
}

pub fn confirmed_detail(confirmations: u64) -> TransactionDetail {
    TransactionDetail {
        transaction: "00".to_string(),
        blockhash: Some("blockhash".to_string()),
        confirmations: Some(confirmations),
        time: Some(1_700_000_000),
        blocktime: Some(1_700_000_000),
    }
}

// ---------------------------------------------------------------------
// FakeGateway
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct FakeGateway {
    pub utxos: Mutex<HashMap<String, Vec<RawUtxo>>>,
    pub details: Mutex<HashMap<String, TransactionDetail>>,
    pub broadcasts: Mutex<Vec<String>>,
    pub broadcast_txid: Mutex<Option<String>>,
    pub detail_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_utxos(self, address: &str, utxos: Vec<RawUtxo>) -> Self {
        self.utxos.lock().unwrap().insert(address.to_string(), utxos);
        self
    }

    pub fn with_detail(self, transaction_id: &str, detail: TransactionDetail) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(transaction_id.to_string(), detail);
        self
    }

    pub fn with_broadcast_txid(self, transaction_id: &str) -> Self {
        *self.broadcast_txid.lock().unwrap() = Some(transaction_id.to_string());
        self
    }
}

#[async_trait]
impl BitcoinGateway for FakeGateway {
    async fn find_many_utxos(&self, bitcoin_address: &str) -> Result<Vec<RawUtxo>, ClientError> {
        Ok(self
            .utxos
            .lock()
            .unwrap()
            .get(bitcoin_address)
            .cloned()
            .unwrap_or_default())
    }

    async fn broadcast_transaction(&self, transaction_hex: &str) -> Result<String, ClientError> {
        self.broadcasts
            .lock()
            .unwrap()
            .push(transaction_hex.to_string());
        Ok(self
            .broadcast_txid
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| hex::encode([0xaa; 32])))
    }

    async fn get_transaction_detail(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionDetail, ClientError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .details
            .lock()
            .unwrap()
            .get(transaction_id)
            .cloned()
            .unwrap_or_else(unconfirmed_detail))
    }
}

// ---------------------------------------------------------------------
// FakeOrdinals
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct FakeOrdinals {
    pub ordinals: Mutex<Vec<OrdinalUtxo>>,
    /// Serve at most this many entries per page regardless of the
    /// requested size, to exercise pagination
    pub page_limit: Mutex<Option<usize>>,
    pub page_calls: AtomicUsize,
}

impl FakeOrdinals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ordinals(self, ordinals: Vec<OrdinalUtxo>) -> Self {
        *self.ordinals.lock().unwrap() = ordinals;
        self
    }

    pub fn with_page_limit(self, limit: usize) -> Self {
        *self.page_limit.lock().unwrap() = Some(limit);
        self
    }
}

#[async_trait]
impl OrdinalIndex for FakeOrdinals {
    async fn find_many_ordinal_utxos(
        &self,
        _bitcoin_address: &str,
        cursor: u64,
        size: u64,
    ) -> Result<OrdinalUtxoPage, ClientError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let all = self.ordinals.lock().unwrap().clone();
        let limit = self
            .page_limit
            .lock()
            .unwrap()
            .unwrap_or(size as usize)
            .min(size as usize);

        let start = (cursor as usize).min(all.len());
        let end = (start + limit).min(all.len());
        Ok(OrdinalUtxoPage {
            cursor,
            total_confirmed: all.len() as u64,
            utxo: all[start..end].to_vec(),
        })
    }
}

// ---------------------------------------------------------------------
// FakeIndexer
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct FakeIndexer {
    pub reserve_settings: Mutex<Vec<ReserveSetting>>,
    pub emission_settings: Mutex<Vec<EmissionSetting>>,
    pub interactions: Mutex<Vec<Interaction>>,
    pub calls: AtomicUsize,
}

impl FakeIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserve_settings(self, settings: Vec<ReserveSetting>) -> Self {
        *self.reserve_settings.lock().unwrap() = settings;
        self
    }

    pub fn with_interactions(self, interactions: Vec<Interaction>) -> Self {
        *self.interactions.lock().unwrap() = interactions;
        self
    }
}

#[async_trait]
impl LayerIndexer for FakeIndexer {
    async fn find_many_interactions(
        &self,
        _size: usize,
        _solana_address: &str,
    ) -> Result<Vec<Interaction>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.interactions.lock().unwrap().clone())
    }

    async fn get_reserve_settings(&self) -> Result<Vec<ReserveSetting>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reserve_settings.lock().unwrap().clone())
    }

    async fn get_emission_settings(&self) -> Result<Vec<EmissionSetting>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.emission_settings.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------
// FakeLedger
// ---------------------------------------------------------------------

#[derive(Default)]
pub struct FakeLedger {
    pub balances: Mutex<HashMap<Pubkey, u64>>,
    pub token_balances: Mutex<HashMap<Pubkey, u64>>,
    pub accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    pub program_accounts: Mutex<HashMap<Pubkey, Vec<(Pubkey, Vec<u8>)>>>,
    pub sent: Mutex<Vec<VersionedTransaction>>,
}

fn rpc_error(message: &str) -> LedgerError {
    LedgerError::Rpc(solana_client::client_error::ClientErrorKind::Custom(message.to_string()).into())
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, pubkey: Pubkey, lamports: u64) {
        self.balances.lock().unwrap().insert(pubkey, lamports);
    }

    pub fn set_token_balance(&self, token_account: Pubkey, amount: u64) {
        self.token_balances
            .lock()
            .unwrap()
            .insert(token_account, amount);
    }

    pub fn set_account(&self, pubkey: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(pubkey, data);
    }

    pub fn push_program_account(&self, program: Pubkey, pubkey: Pubkey, data: Vec<u8>) {
        self.program_accounts
            .lock()
            .unwrap()
            .entry(program)
            .or_default()
            .push((pubkey, data));
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, LedgerError> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(pubkey)
            .copied()
            .unwrap_or(0))
    }

    async fn get_token_account_balance(
        &self,
        token_account: &Pubkey,
    ) -> Result<u64, LedgerError> {
        self.token_balances
            .lock()
            .unwrap()
            .get(token_account)
            .copied()
            .ok_or_else(|| rpc_error("token account not found"))
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(Hash::new_unique())
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError> {
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(Signature::new_unique())
    }

    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_program_accounts(
        &self,
        program: &Pubkey,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, LedgerError> {
        Ok(self
            .program_accounts
            .lock()
            .unwrap()
            .get(program)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------
// On-chain state seeding
// ---------------------------------------------------------------------

/// Program ids and fee collector seeded into a [`FakeLedger`]
pub struct SeededPrograms {
    pub two_way_peg_program: Pubkey,
    pub liquidity_management_program: Pubkey,
    pub layer_fee_collector: Pubkey,
    pub asset_mint: Pubkey,
    pub miner_fee_rate: u64,
}

/// Seed the bootstrap, configuration, and reserve-bootstrap accounts the
/// program bindings read, returning the generated ids.
pub fn seed_programs(ledger: &FakeLedger, context: &Context) -> SeededPrograms {
    let two_way_peg_program = Pubkey::new_unique();
    let liquidity_management_program = Pubkey::new_unique();
    let layer_fee_collector = Pubkey::new_unique();
    let asset_mint = Pubkey::new_unique();
    let miner_fee_rate = 12;

    // bootstrap account: seven program ids back to back
    let mut bootstrap = Vec::new();
    for key in [
        Pubkey::new_unique(),                   // super operator certificate
        Pubkey::new_unique(),                   // chadbuffer
        Pubkey::new_unique(),                   // bitcoin spv
        two_way_peg_program,
        liquidity_management_program,
        Pubkey::new_unique(),                   // delegator
        Pubkey::new_unique(),                   // layer ca
    ] {
        bootstrap.extend_from_slice(key.as_ref());
    }
    let bootstrap_program = Pubkey::from_str(context.bootstrap_program_address()).unwrap();
    ledger.push_program_account(bootstrap_program, Pubkey::new_unique(), bootstrap);

    // two-way-peg configuration PDA
    let mut configuration = b"twp.conf".to_vec();
    configuration.extend_from_slice(layer_fee_collector.as_ref());
    configuration.extend_from_slice(&miner_fee_rate.to_le_bytes());
    let configuration_pda = pdas::derive_configuration(&two_way_peg_program);
    ledger.set_account(configuration_pda, configuration);

    // bootstrap reserve-setting account
    let mut reserve = b"twp.rsrv".to_vec();
    reserve.extend_from_slice(&1u32.to_le_bytes());
    reserve.extend_from_slice(Pubkey::new_unique().as_ref()); // guardian certificate
    reserve.extend_from_slice(asset_mint.as_ref());
    reserve.extend_from_slice(Pubkey::new_unique().as_ref()); // token program
    reserve.extend_from_slice(Pubkey::new_unique().as_ref()); // mint authority
    reserve.extend_from_slice(Pubkey::new_unique().as_ref()); // burn authority
    let reserve_bootstrap =
        Pubkey::from_str(context.bootstrap_reserve_setting_address()).unwrap();
    ledger.set_account(reserve_bootstrap, reserve);

    SeededPrograms {
        two_way_peg_program,
        liquidity_management_program,
        layer_fee_collector,
        asset_mint,
        miner_fee_rate,
    }
}

/// Vault token account for a reserve setting under the seeded programs
pub fn vault_token_account_for(
    programs: &SeededPrograms,
    setting: &ReserveSetting,
) -> Pubkey {
    let reserve = Pubkey::from_str(&setting.address).unwrap();
    let mint = Pubkey::from_str(&setting.asset_mint).unwrap();
    let authority = pdas::derive_spl_token_vault_authority(
        &programs.liquidity_management_program,
        &reserve,
    );
    pdas::associated_token_address(&authority, &mint)
}
