use anchor_lang::prelude::*;

pub const POSITION_SEED: &[u8] = b"position";

/// Informational tag of the staked option; only selects a reward weight
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptionType {
    #[default]
    Call,
    Put,
}

/// One staked option and its lock/reward terms
/// PDA: ["position", option_ref, stake_index]
#[account]
#[derive(Default, Debug)]
pub struct PositionRecord {
    /// Staking user
    pub owner: Pubkey,

    /// Pool ledger this position is counted in
    pub pool: Pubkey,

    /// Opaque reference to the external option contract
    pub option_ref: Pubkey,

    pub option_type: OptionType,

    /// Lock duration in seconds
    pub lock_period: i64,

    /// Start of the current lock term
    pub staked_at: i64,

    /// staked_at + lock_period
    pub unlock_at: i64,

    /// Accrual checkpoint; rewards before this are already in `reward_accrued`
    pub last_accrual_at: i64,

    /// Timestamp of the terminal transition (0 while locked)
    pub unstaked_at: i64,

    pub locked: bool,

    /// Computed but unclaimed reward
    pub reward_accrued: u64,

    /// Rewards re-staked into this position; grows the accrual base
    pub compounded_amount: u64,

    /// Rewards paid out from this position
    pub total_claimed: u64,

    /// Rewards lost to early-unstake penalty
    pub total_forfeited: u64,

    /// Bumped on every committed mutation
    pub revision: u64,

    /// Position number for this option reference
    pub stake_index: u64,

    pub bump: u8,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

impl PositionRecord {
    pub const SIZE: usize = 8 + // discriminator
        32 + // owner
        32 + // pool
        32 + // option_ref
        1 +  // option_type
        8 +  // lock_period
        8 +  // staked_at
        8 +  // unlock_at
        8 +  // last_accrual_at
        8 +  // unstaked_at
        1 +  // locked
        8 +  // reward_accrued
        8 +  // compounded_amount
        8 +  // total_claimed
        8 +  // total_forfeited
        8 +  // revision
        8 +  // stake_index
        1 +  // bump
        32;  // reserved

    /// The clock comparison that decides whether an unstake is early
    pub fn is_early(&self, now: i64) -> bool {
        now < self.unlock_at
    }

    /// Start of the window not yet folded into `reward_accrued`
    pub fn accrual_start(&self) -> i64 {
        self.staked_at.max(self.last_accrual_at)
    }
}
