use anchor_lang::prelude::*;

use crate::engine::ClaimMode;
use crate::state::{OptionType, PayoutMode, PoolPolicy};

/// Emitted when a reward pool is created
#[event]
pub struct PoolCreated {
    pub pool: Pubkey,
    pub reward_mint: Pubkey,
    pub authority: Pubkey,
    pub payout_mode: PayoutMode,
    pub policy: PoolPolicy,
    pub timestamp: i64,
}

/// Emitted when pool policy or pause state changes
#[event]
pub struct PoolUpdated {
    pub pool: Pubkey,
    pub admin: Pubkey,
    pub policy: PoolPolicy,
    pub paused: bool,
    pub timestamp: i64,
}

/// Emitted when an option is locked into a pool
#[event]
pub struct OptionStaked {
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub position: Pubkey,
    pub option_ref: Pubkey,
    pub option_type: OptionType,
    pub lock_period: i64,
    pub unlock_at: i64,
    pub pool_total_staked: u64,
    pub timestamp: i64,
}

/// Emitted when a position leaves the locked state
#[event]
pub struct OptionUnstaked {
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub position: Pubkey,
    pub option_ref: Pubkey,
    pub reward_accrued: u64,
    pub forfeited: u64,
    pub emergency: bool,
    pub pool_total_staked: u64,
    pub timestamp: i64,
}

/// Emitted when an expired position starts a new lock term
#[event]
pub struct OptionRestaked {
    pub owner: Pubkey,
    pub position: Pubkey,
    pub reward_accrued: u64,
    pub unlock_at: i64,
    pub timestamp: i64,
}

/// Emitted when rewards are paid out or compounded
#[event]
pub struct RewardsClaimed {
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub position: Pubkey,
    pub amount: u64,
    pub mode: ClaimMode,
    pub compounded_amount: u64,
    pub timestamp: i64,
}
