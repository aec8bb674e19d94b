//! Borsh layouts of the on-chain accounts this client reads
//!
//! Apart from the bootstrap account (raw, written at genesis), every
//! account starts with an 8-byte discriminator identifying its type.

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

use crate::zpl::ZplError;

/// Length of the account discriminator prefix
pub const DISCRIMINATOR_LEN: usize = 8;

/// Discriminator of entity-derived reserve address accounts
pub const EDRA_DISCRIMINATOR: [u8; 8] = *b"twp.edra";

/// Discriminator of entity-derived reserve accounts
pub const EDR_DISCRIMINATOR: [u8; 8] = *b"twp.edr\0";

fn pubkey(bytes: [u8; 32]) -> Pubkey {
    Pubkey::new_from_array(bytes)
}

/// The seven program ids published in the bootstrap account
#[derive(Debug, Clone, Copy)]
pub struct ZplAccounts {
    pub super_operator_certificate: Pubkey,
    pub chadbuffer_program: Pubkey,
    pub bitcoin_spv_program: Pubkey,
    pub two_way_peg_program: Pubkey,
    pub liquidity_management_program: Pubkey,
    pub delegator_program: Pubkey,
    pub layer_ca_program: Pubkey,
}

#[derive(BorshDeserialize)]
struct ZplAccountsRaw {
    super_operator_certificate: [u8; 32],
    chadbuffer_program: [u8; 32],
    bitcoin_spv_program: [u8; 32],
    two_way_peg_program: [u8; 32],
    liquidity_management_program: [u8; 32],
    delegator_program: [u8; 32],
    layer_ca_program: [u8; 32],
}

impl ZplAccounts {
    /// Decode the bootstrap account (no discriminator prefix).
    ///
    /// Trailing bytes are tolerated; the layout is a prefix.
    pub fn parse(data: &[u8]) -> Result<Self, ZplError> {
        let raw = ZplAccountsRaw::deserialize(&mut &data[..])
            .map_err(|e| ZplError::Layout(format!("bootstrap account: {}", e)))?;
        Ok(Self {
            super_operator_certificate: pubkey(raw.super_operator_certificate),
            chadbuffer_program: pubkey(raw.chadbuffer_program),
            bitcoin_spv_program: pubkey(raw.bitcoin_spv_program),
            two_way_peg_program: pubkey(raw.two_way_peg_program),
            liquidity_management_program: pubkey(raw.liquidity_management_program),
            delegator_program: pubkey(raw.delegator_program),
            layer_ca_program: pubkey(raw.layer_ca_program),
        })
    }
}

/// The bootstrap reserve-setting account: mint and authority wiring
#[derive(Debug, Clone, Copy)]
pub struct ReserveBootstrap {
    pub seed: u32,
    pub guardian_certificate: Pubkey,
    pub asset_mint: Pubkey,
    pub token_program_id: Pubkey,
    pub spl_token_mint_authority: Pubkey,
    pub spl_token_burn_authority: Pubkey,
}

#[derive(BorshDeserialize)]
struct ReserveBootstrapRaw {
    seed: u32,
    guardian_certificate: [u8; 32],
    asset_mint: [u8; 32],
    token_program_id: [u8; 32],
    spl_token_mint_authority: [u8; 32],
    spl_token_burn_authority: [u8; 32],
}

impl ReserveBootstrap {
    pub fn parse(data: &[u8]) -> Result<Self, ZplError> {
        let mut payload = data
            .get(DISCRIMINATOR_LEN..)
            .ok_or_else(|| ZplError::Layout("reserve bootstrap account too short".to_string()))?;
        let raw = ReserveBootstrapRaw::deserialize(&mut payload)
            .map_err(|e| ZplError::Layout(format!("reserve bootstrap account: {}", e)))?;
        Ok(Self {
            seed: raw.seed,
            guardian_certificate: pubkey(raw.guardian_certificate),
            asset_mint: pubkey(raw.asset_mint),
            token_program_id: pubkey(raw.token_program_id),
            spl_token_mint_authority: pubkey(raw.spl_token_mint_authority),
            spl_token_burn_authority: pubkey(raw.spl_token_burn_authority),
        })
    }
}

/// The two-way-peg configuration PDA contents
#[derive(Debug, Clone, Copy)]
pub struct TwoWayPegConfiguration {
    pub layer_fee_collector: Pubkey,
    /// Current miner fee rate in sat/vB
    pub miner_fee_rate: u64,
}

#[derive(BorshDeserialize)]
struct TwoWayPegConfigurationRaw {
    layer_fee_collector: [u8; 32],
    miner_fee_rate: u64,
}

impl TwoWayPegConfiguration {
    pub fn parse(data: &[u8]) -> Result<Self, ZplError> {
        let mut payload = data
            .get(DISCRIMINATOR_LEN..)
            .ok_or_else(|| ZplError::Layout("configuration account too short".to_string()))?;
        let raw = TwoWayPegConfigurationRaw::deserialize(&mut payload)
            .map_err(|e| ZplError::Layout(format!("configuration account: {}", e)))?;
        Ok(Self {
            layer_fee_collector: pubkey(raw.layer_fee_collector),
            miner_fee_rate: raw.miner_fee_rate,
        })
    }
}

/// A provisioned per-user deposit address record
#[derive(Debug, Clone, Copy)]
pub struct EntityDerivedReserveAddress {
    /// Account address of this record
    pub pubkey: Pubkey,
    pub solana_owner: Pubkey,
    pub reserve_setting: Pubkey,
    pub guardian_certificate: Pubkey,
    /// Taproot output key of the deposit address
    pub address: [u8; 32],
    pub address_type: u8,
}

#[derive(BorshDeserialize)]
struct EntityDerivedReserveAddressRaw {
    solana_owner: [u8; 32],
    reserve_setting: [u8; 32],
    guardian_certificate: [u8; 32],
    address: [u8; 32],
    address_type: u8,
}

impl EntityDerivedReserveAddress {
    /// Parse when the discriminator matches; `None` for other account types
    pub fn try_parse(pubkey_of_account: Pubkey, data: &[u8]) -> Option<Self> {
        if data.get(..DISCRIMINATOR_LEN)? != EDRA_DISCRIMINATOR {
            return None;
        }
        let raw =
            EntityDerivedReserveAddressRaw::deserialize(&mut &data[DISCRIMINATOR_LEN..]).ok()?;
        Some(Self {
            pubkey: pubkey_of_account,
            solana_owner: pubkey(raw.solana_owner),
            reserve_setting: pubkey(raw.reserve_setting),
            guardian_certificate: pubkey(raw.guardian_certificate),
            address: raw.address,
            address_type: raw.address_type,
        })
    }
}

/// A reserve registered for entity-derived deposit addressing
#[derive(Debug, Clone, Copy)]
pub struct EntityDerivedReserve {
    /// Account address of this record
    pub pubkey: Pubkey,
    pub reserve_setting: Pubkey,
}

#[derive(BorshDeserialize)]
struct EntityDerivedReserveRaw {
    reserve_setting: [u8; 32],
}

impl EntityDerivedReserve {
    /// Parse when the discriminator matches; `None` for other account types
    pub fn try_parse(pubkey_of_account: Pubkey, data: &[u8]) -> Option<Self> {
        if data.get(..DISCRIMINATOR_LEN)? != EDR_DISCRIMINATOR {
            return None;
        }
        let raw = EntityDerivedReserveRaw::deserialize(&mut &data[DISCRIMINATOR_LEN..]).ok()?;
        Some(Self {
            pubkey: pubkey_of_account,
            reserve_setting: pubkey(raw.reserve_setting),
        })
    }
}
