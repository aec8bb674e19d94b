//! Shared wire and domain types
//!
//! Wire structs mirror the JSON shapes served by the remote indexers
//! (camelCase field names, large amounts transported as decimal strings).
//! Domain types add the derived flags the indexers do not store.

use serde::{Deserialize, Serialize};

/// A spendable Bitcoin output as reported by the UTXO indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUtxo {
    pub transaction_id: String,
    pub transaction_index: u32,
    pub satoshis: u64,
    pub block_height: u64,
}

impl RawUtxo {
    /// Identity of a UTXO: `(transaction id, output index)`
    pub fn outpoint(&self) -> (&str, u32) {
        (&self.transaction_id, self.transaction_index)
    }
}

/// A UTXO annotated with the derived `ordinal` and `blocked` flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub transaction_id: String,
    pub transaction_index: u32,
    pub satoshis: u64,
    pub block_height: u64,

    /// The output carries an inscription
    pub ordinal: bool,

    /// The output is reserved by a pending local transaction
    pub blocked: bool,
}

impl Utxo {
    pub fn from_raw(raw: RawUtxo, ordinal: bool, blocked: bool) -> Self {
        Self {
            transaction_id: raw.transaction_id,
            transaction_index: raw.transaction_index,
            satoshis: raw.satoshis,
            block_height: raw.block_height,
            ordinal,
            blocked,
        }
    }

    /// Strip the derived flags back to the wire form
    pub fn raw(&self) -> RawUtxo {
        RawUtxo {
            transaction_id: self.transaction_id.clone(),
            transaction_index: self.transaction_index,
            satoshis: self.satoshis,
            block_height: self.block_height,
        }
    }

    pub fn outpoint(&self) -> (&str, u32) {
        (&self.transaction_id, self.transaction_index)
    }
}

/// Transaction status as reported by the UTXO indexer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub transaction: String,
    pub blockhash: Option<String>,
    pub confirmations: Option<u64>,
    pub time: Option<i64>,
    pub blocktime: Option<i64>,
}

/// One inscription-bearing output from the ordinal indexer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdinalUtxo {
    pub txid: String,
    pub vout: u32,
    pub satoshi: u64,
}

/// One page of the ordinal indexer's cursor pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdinalUtxoPage {
    pub cursor: u64,
    pub total_confirmed: u64,
    pub utxo: Vec<OrdinalUtxo>,
}

/// The chain a lifecycle step happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chain {
    Solana,
    Bitcoin,
}

/// Kind of a tracked interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Deposit = 0,
    Withdrawal = 1,
    ExternalReserveDeposit = 2,
    ExternalReserveWithdrawal = 3,
}

// InteractionType travels as a bare integer on the wire.
impl Serialize for InteractionType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for InteractionType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(InteractionType::Deposit),
            1 => Ok(InteractionType::Withdrawal),
            2 => Ok(InteractionType::ExternalReserveDeposit),
            3 => Ok(InteractionType::ExternalReserveWithdrawal),
            other => Err(serde::de::Error::custom(format!(
                "unknown interaction type: {}",
                other
            ))),
        }
    }
}

/// Lifecycle status of an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionStatus {
    // Deposit
    BitcoinDepositToHotReserve,
    BitcoinDepositToEntityDerivedReserve,
    VerifyDepositToHotReserveTransaction,
    SolanaDepositToEntityDerivedReserve,
    SolanaDepositToHotReserve,
    AddLockToColdReserveProposal,
    BitcoinLockToColdReserve,
    VerifyLockToColdReserveTransaction,
    SolanaLockToColdReserve,
    Peg,
    Reclaim,
    PegAndDistribute,

    // Withdrawal
    AddWithdrawalRequest,
    AddUnlockToUserProposal,
    BitcoinUnlockToUser,
    VerifyUnlockToUserTransaction,
    SolanaUnlockToUser,
    Unpeg,
    DeprecateWithdrawalRequest,

    // External reserve
    BitcoinLockToExternalReserve,
    VerifyLockToExternalReserveTransaction,
    BitcoinUnlockFromExternalReserve,
    VerifyUnlockFromExternalReserveTransaction,

    Empty,
    DustAmount,
}

/// One step in an interaction's lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionStep {
    pub chain: Chain,
    pub action: String,
    pub transaction: String,
    pub timestamp: i64,
}

/// Certificate of the guardian handling an interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianCertificate {
    pub name: String,
    pub address: String,
    pub entity: String,
    pub status: String,
}

/// Swap metadata attached to swap-style interactions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInfo {
    pub swap_input_amount: String,
    pub swap_input_mint: String,
    pub swap_output_amount: String,
}

/// A tracked deposit or withdrawal lifecycle record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub interaction_id: String,
    pub interaction_type: InteractionType,
    pub status: InteractionStatus,
    pub app_developer: String,
    pub initiated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step_at: Option<i64>,
    pub amount: String,
    pub miner_fee: String,
    pub service_fee: String,
    pub source: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_certificate: Option<GuardianCertificate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<InteractionStep>>,
    #[serde(default)]
    pub swap_info: Option<SwapInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_request_pda: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_block: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity_management_methods: Option<Vec<String>>,
}

/// On-chain reserve ("guardian") configuration served by the indexer.
///
/// Remaining quota is never part of this record; it is derived from the
/// vault token balance and the windowed accumulator (see the reserve
/// model).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSetting {
    pub address: String,
    pub seed: u32,
    pub guardian_certificate: String,
    pub asset_mint: String,
    pub token_program_id: String,
    pub spl_token_mint_authority: String,
    pub spl_token_burn_authority: String,
    #[serde(with = "string_amount")]
    pub total_amount_locked: u64,
    #[serde(with = "string_amount")]
    pub total_amount_pegged: u64,
    /// Length of the withdrawal accounting window, in seconds
    #[serde(with = "string_amount")]
    pub withdrawal_window: u64,
    /// Unix timestamp the current window opened at
    #[serde(with = "string_amount")]
    pub withdrawal_window_started_at: u64,
    /// Amount withdrawn inside the current window, in satoshi
    #[serde(with = "string_amount")]
    pub accumulated_withdrawal_amount: u64,
    /// Hard cap per window, in satoshi
    #[serde(with = "string_amount")]
    pub max_reserve_withdrawal_quota: u64,
}

/// Delegation rate option inside an emission setting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateOption {
    pub lock_days: u32,
    pub initial_rate: f64,
    pub current_rate: f64,
}

/// Emission ("delegator") guardian configuration served by the indexer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionSetting {
    pub address: String,
    pub seed: u32,
    pub status: u32,
    pub guardian_certificate: String,
    #[serde(with = "string_amount")]
    pub max_quota: u64,
    #[serde(with = "string_amount")]
    pub available_quota: u64,
    #[serde(with = "string_amount")]
    pub accumulated_amount: u64,
    #[serde(with = "string_amount")]
    pub escrow_balance: u64,
    pub penalty_rate: f64,
    pub delegation_removal_lock_days: u32,
    pub quota_increasing_rate: f64,
    pub delegate_options: Vec<DelegateOption>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Serde helper for u64 amounts transported as decimal strings.
///
/// The indexers emit amounts as strings; tolerate bare numbers too.
pub(crate) mod string_amount {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrString {
            Number(u64),
            String(String),
        }

        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
