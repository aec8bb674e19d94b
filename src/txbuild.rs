//! Deposit transaction builder
//!
//! Selects inputs from the depositor's spendable UTXOs, pays the reserve
//! deposit address, and returns change to the depositor's own taproot
//! address. The result is an unsigned PSBT whose inputs carry the witness
//! UTXO and taproot internal key a wallet needs to sign.

use std::str::FromStr;

use bitcoin::absolute::LockTime;
use bitcoin::key::{Secp256k1, XOnlyPublicKey};
use bitcoin::transaction::Version;
use bitcoin::{
    Address, Amount, Network, OutPoint, Psbt, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid,
    Witness,
};

use crate::types::{RawUtxo, Utxo};

/// Outputs below this value fold into the miner fee instead of creating
/// a change output
pub const DUST_LIMIT_SATOSHI: u64 = 546;

/// Errors from deposit transaction building
#[derive(Debug, thiserror::Error)]
pub enum TxBuildError {
    #[error("No UTXOs available")]
    NoUtxos,

    #[error("Insufficient funds: need {needed} sats, have {available} sats")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("Invalid reserve address: {0}")]
    InvalidAddress(String),

    #[error("Invalid transaction id: {0}")]
    InvalidTransactionId(String),

    #[error("PSBT construction failed: {0}")]
    Psbt(#[from] bitcoin::psbt::Error),
}

/// Estimated virtual size of a taproot key-spend transaction
fn estimate_vbytes(inputs: u64, outputs: u64) -> u64 {
    11 + 58 * inputs + 43 * outputs
}

/// Build an unsigned deposit PSBT.
///
/// Inputs are chosen largest-first from `utxos` until they cover the
/// amount plus the estimated fee at `fee_rate` (sat/vB). Returns the PSBT
/// together with the UTXOs it consumes, so the caller can reserve them
/// once the transaction is broadcast.
pub fn build_deposit_transaction(
    utxos: &[Utxo],
    reserve_address: &str,
    amount_satoshi: u64,
    depositor_internal_key: XOnlyPublicKey,
    fee_rate: u64,
    network: Network,
) -> Result<(Psbt, Vec<RawUtxo>), TxBuildError> {
    if utxos.is_empty() {
        return Err(TxBuildError::NoUtxos);
    }

    let reserve_script = Address::from_str(reserve_address)
        .map_err(|e| TxBuildError::InvalidAddress(e.to_string()))?
        .assume_checked()
        .script_pubkey();

    let secp = Secp256k1::verification_only();
    let depositor_script = Address::p2tr(&secp, depositor_internal_key, None, network)
        .script_pubkey();

    let mut candidates: Vec<&Utxo> = utxos.iter().collect();
    candidates.sort_by(|a, b| {
        b.satoshis
            .cmp(&a.satoshis)
            .then_with(|| a.outpoint().cmp(&b.outpoint()))
    });

    let mut selected: Vec<&Utxo> = Vec::new();
    let mut total = 0u64;
    let mut fee = 0u64;
    for utxo in candidates {
        selected.push(utxo);
        total += utxo.satoshis;
        fee = fee_rate * estimate_vbytes(selected.len() as u64, 2);
        if total >= amount_satoshi.saturating_add(fee) {
            break;
        }
    }

    let needed = amount_satoshi.saturating_add(fee);
    if total < needed {
        return Err(TxBuildError::InsufficientFunds {
            needed,
            available: total,
        });
    }

    let mut outputs = vec![TxOut {
        value: Amount::from_sat(amount_satoshi),
        script_pubkey: reserve_script,
    }];
    let change = total - amount_satoshi - fee;
    if change >= DUST_LIMIT_SATOSHI {
        outputs.push(TxOut {
            value: Amount::from_sat(change),
            script_pubkey: depositor_script.clone(),
        });
    }

    let mut inputs = Vec::with_capacity(selected.len());
    for utxo in &selected {
        let txid = Txid::from_str(&utxo.transaction_id)
            .map_err(|e| TxBuildError::InvalidTransactionId(e.to_string()))?;
        inputs.push(TxIn {
            previous_output: OutPoint {
                txid,
                vout: utxo.transaction_index,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
            witness: Witness::new(),
        });
    }

    let transaction = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: inputs,
        output: outputs,
    };

    let mut psbt = Psbt::from_unsigned_tx(transaction)?;
    for (index, utxo) in selected.iter().enumerate() {
        psbt.inputs[index].witness_utxo = Some(TxOut {
            value: Amount::from_sat(utxo.satoshis),
            script_pubkey: depositor_script.clone(),
        });
        psbt.inputs[index].tap_internal_key = Some(depositor_internal_key);
    }

    let used = selected.iter().map(|utxo| utxo.raw()).collect();
    Ok((psbt, used))
}
