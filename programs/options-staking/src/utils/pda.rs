//! Address derivation for off-chain callers and tests.

use anchor_lang::prelude::*;

use crate::state::{
    GLOBAL_CONFIG_SEED, OPTION_LOCK_SEED, POOL_AUTHORITY_SEED, POOL_LEDGER_SEED, POSITION_SEED,
    USER_LEDGER_SEED,
};

pub fn find_global_config_address() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[GLOBAL_CONFIG_SEED], &crate::ID)
}

pub fn find_pool_address(reward_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_LEDGER_SEED, reward_mint.as_ref()], &crate::ID)
}

/// Signer PDA that mints rewards or owns the reward reserve
pub fn find_pool_authority_address(pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_AUTHORITY_SEED, pool.as_ref()], &crate::ID)
}

pub fn find_user_ledger_address(pool: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[USER_LEDGER_SEED, pool.as_ref(), owner.as_ref()],
        &crate::ID,
    )
}

pub fn find_option_lock_address(option_ref: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[OPTION_LOCK_SEED, option_ref.as_ref()], &crate::ID)
}

/// Address of the `stake_index`-th position opened for `option_ref`
pub fn find_position_address(option_ref: &Pubkey, stake_index: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[POSITION_SEED, option_ref.as_ref(), &stake_index.to_le_bytes()],
        &crate::ID,
    )
}
