//! PDA derivations for the peg programs
//!
//! Seeds mirror the on-chain programs; every derivation is a pure
//! function of the program id and its inputs.

use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

/// SPL token program
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// SPL associated-token-account program
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Configuration PDA of either peg program
pub fn derive_configuration(program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[b"configuration"], program).0
}

/// Interaction PDA from a transaction id and nonce
pub fn derive_interaction(
    two_way_peg_program: &Pubkey,
    transaction_id: &[u8],
    nonce: u64,
) -> Pubkey {
    Pubkey::find_program_address(
        &[b"interaction", transaction_id, &nonce.to_le_bytes()],
        two_way_peg_program,
    )
    .0
}

/// Authority owning a reserve's SPL token vault
pub fn derive_spl_token_vault_authority(
    liquidity_management_program: &Pubkey,
    reserve_setting: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[b"spl-vault-authority", reserve_setting.as_ref()],
        liquidity_management_program,
    )
    .0
}

/// Vault bookkeeping account of a reserve
pub fn derive_vault_setting(
    liquidity_management_program: &Pubkey,
    reserve_setting: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[b"vault-setting", reserve_setting.as_ref()],
        liquidity_management_program,
    )
    .0
}

/// A wallet's position inside a vault
pub fn derive_position(
    liquidity_management_program: &Pubkey,
    vault_setting: &Pubkey,
    owner: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[b"position", vault_setting.as_ref(), owner.as_ref()],
        liquidity_management_program,
    )
    .0
}

/// Entity-derived reserve address record for a wallet and reserve
pub fn derive_entity_derived_reserve_address(
    two_way_peg_program: &Pubkey,
    reserve_setting: &Pubkey,
    owner: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[b"edra", reserve_setting.as_ref(), owner.as_ref()],
        two_way_peg_program,
    )
    .0
}

/// Canonical SPL associated token account
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}
