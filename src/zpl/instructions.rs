//! Instruction builders for the peg programs
//!
//! Instruction data is a single-byte discriminant followed by the
//! borsh-encoded argument struct. Builders derive every PDA they need so
//! callers only supply the business inputs.

use borsh::BorshSerialize;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::zpl::pdas;
use crate::zpl::ZplError;

const STORE: u8 = 2;
const ADD_WITHDRAWAL_REQUEST: u8 = 7;
const CREATE_ENTITY_DERIVED_RESERVE_ADDRESS: u8 = 4;

fn encode<A: BorshSerialize>(discriminant: u8, args: &A) -> Result<Vec<u8>, ZplError> {
    let mut data = vec![discriminant];
    args.serialize(&mut data)
        .map_err(|e| ZplError::Encoding(e.to_string()))?;
    Ok(data)
}

#[derive(BorshSerialize)]
struct StoreArgs {
    amount: u64,
}

/// Move wrapped-token balance from the owner's position into a reserve's
/// vault bookkeeping, the first half of a withdrawal pair.
pub fn build_store_ix(
    liquidity_management_program: &Pubkey,
    amount: u64,
    owner: &Pubkey,
    asset_mint: &Pubkey,
    reserve_setting: &Pubkey,
) -> Result<Instruction, ZplError> {
    let vault_authority =
        pdas::derive_spl_token_vault_authority(liquidity_management_program, reserve_setting);
    let vault_setting = pdas::derive_vault_setting(liquidity_management_program, reserve_setting);
    let vault_token_account = pdas::associated_token_address(&vault_authority, asset_mint);
    let owner_token_account = pdas::associated_token_address(owner, asset_mint);
    let position = pdas::derive_position(liquidity_management_program, &vault_setting, owner);
    let configuration = pdas::derive_configuration(liquidity_management_program);

    Ok(Instruction {
        program_id: *liquidity_management_program,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new_readonly(*reserve_setting, false),
            AccountMeta::new(vault_setting, false),
            AccountMeta::new_readonly(vault_authority, false),
            AccountMeta::new(vault_token_account, false),
            AccountMeta::new(owner_token_account, false),
            AccountMeta::new(position, false),
            AccountMeta::new_readonly(configuration, false),
            AccountMeta::new_readonly(*asset_mint, false),
            AccountMeta::new_readonly(pdas::TOKEN_PROGRAM_ID, false),
        ],
        data: encode(STORE, &StoreArgs { amount })?,
    })
}

#[derive(BorshSerialize)]
struct AddWithdrawalRequestArgs {
    amount: u64,
    timestamp: i64,
    receiver_address: [u8; 32],
    receiver_address_type: u8,
}

/// Record a withdrawal request against a reserve, the second half of a
/// withdrawal pair.
#[allow(clippy::too_many_arguments)]
pub fn build_add_withdrawal_request_ix(
    two_way_peg_program: &Pubkey,
    amount: u64,
    timestamp: i64,
    receiver_address: [u8; 32],
    receiver_address_type: u8,
    owner: &Pubkey,
    layer_fee_collector: &Pubkey,
    reserve_setting: &Pubkey,
    liquidity_management_program: &Pubkey,
) -> Result<Instruction, ZplError> {
    let lm_configuration = pdas::derive_configuration(liquidity_management_program);
    let vault_setting = pdas::derive_vault_setting(liquidity_management_program, reserve_setting);
    let position = pdas::derive_position(liquidity_management_program, &vault_setting, owner);

    Ok(Instruction {
        program_id: *two_way_peg_program,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(*layer_fee_collector, false),
            AccountMeta::new_readonly(*reserve_setting, false),
            AccountMeta::new_readonly(*liquidity_management_program, false),
            AccountMeta::new_readonly(lm_configuration, false),
            AccountMeta::new(vault_setting, false),
            AccountMeta::new(position, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: encode(
            ADD_WITHDRAWAL_REQUEST,
            &AddWithdrawalRequestArgs {
                amount,
                timestamp,
                receiver_address,
                receiver_address_type,
            },
        )?,
    })
}

#[derive(BorshSerialize)]
struct CreateEntityDerivedReserveAddressArgs {
    address_type: u8,
}

/// Provision a per-user deposit address under a reserve
pub fn build_create_entity_derived_reserve_address_ix(
    two_way_peg_program: &Pubkey,
    owner: &Pubkey,
    reserve_setting: &Pubkey,
    guardian_certificate: &Pubkey,
    layer_fee_collector: &Pubkey,
    entity_derived_reserve: &Pubkey,
    address_type: u8,
) -> Result<Instruction, ZplError> {
    let edra =
        pdas::derive_entity_derived_reserve_address(two_way_peg_program, reserve_setting, owner);

    Ok(Instruction {
        program_id: *two_way_peg_program,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new_readonly(*reserve_setting, false),
            AccountMeta::new_readonly(*guardian_certificate, false),
            AccountMeta::new(*layer_fee_collector, false),
            AccountMeta::new_readonly(*entity_derived_reserve, false),
            AccountMeta::new(edra, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: encode(
            CREATE_ENTITY_DERIVED_RESERVE_ADDRESS,
            &CreateEntityDerivedReserveAddressArgs { address_type },
        )?,
    })
}
