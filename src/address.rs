//! Bitcoin address helpers for the peg protocol
//!
//! The on-chain withdrawal request stores the receiver as a fixed 32-byte
//! field: the taproot output key for P2TR receivers, or the 20-byte hash
//! left-aligned and zero-padded for P2WPKH/P2PKH receivers. Deposits are
//! restricted to taproot addresses elsewhere; withdrawals accept all three
//! forms.

use bitcoin::address::{Address, AddressType};
use bitcoin::key::{TweakedPublicKey, XOnlyPublicKey};
use bitcoin::Network;
use std::str::FromStr;

/// Receiver address forms understood by the peg programs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitcoinAddressType {
    P2tr,
    P2wpkh,
    P2pkh,
}

impl BitcoinAddressType {
    /// Wire code used in instruction data
    pub fn code(self) -> u8 {
        match self {
            BitcoinAddressType::P2tr => 0,
            BitcoinAddressType::P2wpkh => 1,
            BitcoinAddressType::P2pkh => 2,
        }
    }
}

/// Errors from address parsing and conversion
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid bitcoin address: {0}")]
    Parse(#[from] bitcoin::address::ParseError),

    #[error("Unsupported address type: {0}")]
    Unsupported(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Classify a bitcoin address into the peg-supported forms
pub fn classify(address: &str) -> Result<BitcoinAddressType, AddressError> {
    let parsed = Address::from_str(address)?.assume_checked();
    match parsed.address_type() {
        Some(AddressType::P2tr) => Ok(BitcoinAddressType::P2tr),
        Some(AddressType::P2wpkh) => Ok(BitcoinAddressType::P2wpkh),
        Some(AddressType::P2pkh) => Ok(BitcoinAddressType::P2pkh),
        Some(other) => Err(AddressError::Unsupported(other.to_string())),
        None => Err(AddressError::Unsupported("unknown".to_string())),
    }
}

/// Encode a receiver address into the 32-byte on-chain form
pub fn receiver_address_bytes(
    address: &str,
) -> Result<([u8; 32], BitcoinAddressType), AddressError> {
    let address_type = classify(address)?;
    let parsed = Address::from_str(address)?.assume_checked();
    let script = parsed.script_pubkey();
    let script_bytes = script.as_bytes();

    let mut receiver = [0u8; 32];
    match address_type {
        // OP_1 OP_PUSH32 <output key>
        BitcoinAddressType::P2tr => receiver.copy_from_slice(&script_bytes[2..34]),
        // OP_0 OP_PUSH20 <pubkey hash>
        BitcoinAddressType::P2wpkh => receiver[..20].copy_from_slice(&script_bytes[2..22]),
        // OP_DUP OP_HASH160 OP_PUSH20 <pubkey hash> OP_EQUALVERIFY OP_CHECKSIG
        BitcoinAddressType::P2pkh => receiver[..20].copy_from_slice(&script_bytes[3..23]),
    }
    Ok((receiver, address_type))
}

/// X-only form of a hex-encoded public key.
///
/// Accepts a 33-byte compressed key (parity byte stripped) or a 32-byte
/// x-only key.
pub fn internal_xonly_pubkey(pubkey_hex: &str) -> Result<XOnlyPublicKey, AddressError> {
    let bytes =
        hex::decode(pubkey_hex).map_err(|e| AddressError::InvalidPublicKey(e.to_string()))?;
    let xonly = match bytes.len() {
        33 => &bytes[1..],
        32 => &bytes[..],
        n => {
            return Err(AddressError::InvalidPublicKey(format!(
                "expected 32 or 33 bytes, got {}",
                n
            )))
        }
    };
    XOnlyPublicKey::from_slice(xonly).map_err(|e| AddressError::InvalidPublicKey(e.to_string()))
}

/// X-only form of a hex-encoded public key, as hex
pub fn internal_xonly_pubkey_hex(pubkey_hex: &str) -> Result<String, AddressError> {
    Ok(internal_xonly_pubkey(pubkey_hex)?.to_string())
}

/// Taproot address for an already-tweaked 32-byte output key
pub fn p2tr_address_from_output_key(
    output_key: &[u8; 32],
    network: Network,
) -> Result<String, AddressError> {
    let xonly = XOnlyPublicKey::from_slice(output_key)
        .map_err(|e| AddressError::InvalidPublicKey(e.to_string()))?;
    let tweaked = TweakedPublicKey::dangerous_assume_tweaked(xonly);
    Ok(Address::p2tr_tweaked(tweaked, network).to_string())
}
