use anchor_lang::prelude::*;

pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

use engine::ClaimReceipt;
use instructions::*;
use state::{OptionType, PayoutMode, PoolPolicy};

declare_id!("eMMu2ne1vM6zeLyYs5Cq5PV7PREB5h7CvYhz2vGSrFR");

/// Options Staking Program
///
/// Lock option positions into a reward pool for a chosen period and earn
/// rewards that grow with lock tenure. Early exits forfeit part of the
/// unclaimed reward.
#[program]
pub mod options_staking {
    use super::*;

    /// Initialize global config (one-time admin setup)
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    /// Create a reward pool paying out `reward_mint`
    pub fn create_pool(
        ctx: Context<CreatePool>,
        policy: PoolPolicy,
        payout_mode: PayoutMode,
    ) -> Result<()> {
        instructions::create_pool::handler(ctx, policy, payout_mode)
    }

    /// Change pool policy or pause state (admin only)
    pub fn update_pool(
        ctx: Context<UpdatePool>,
        policy: Option<PoolPolicy>,
        paused: Option<bool>,
    ) -> Result<()> {
        instructions::update_pool::handler(ctx, policy, paused)
    }

    /// Lock an option for `lock_period` seconds. Returns the new position address.
    pub fn stake(
        ctx: Context<Stake>,
        option_ref: Pubkey,
        lock_period: i64,
        option_type: OptionType,
    ) -> Result<Pubkey> {
        instructions::stake::handler(ctx, option_ref, lock_period, option_type)
    }

    /// Lock several options at once; `remaining_accounts` holds an
    /// `(option_lock, position)` pair per entry. Returns the position addresses.
    pub fn stake_batch<'info>(
        ctx: Context<'_, '_, 'info, 'info, StakeBatch<'info>>,
        entries: Vec<BatchStakeEntry>,
    ) -> Result<Vec<Pubkey>> {
        instructions::stake_batch::handler(ctx, entries)
    }

    /// Release a position. `early` accepts the penalty, even after expiry.
    pub fn unstake(
        ctx: Context<Unstake>,
        early: bool,
        expected_revision: Option<u64>,
    ) -> Result<u64> {
        instructions::unstake::handler(ctx, early, expected_revision)
    }

    /// Release a position from a paused pool without penalty
    pub fn emergency_unstake(ctx: Context<Unstake>) -> Result<u64> {
        instructions::emergency_unstake::handler(ctx)
    }

    /// Start a new lock term on an expired position
    pub fn restake(ctx: Context<Restake>, expected_revision: Option<u64>) -> Result<u64> {
        instructions::restake::handler(ctx, expected_revision)
    }

    /// Pay out or compound the claimable reward of a position
    pub fn claim_rewards(
        ctx: Context<ClaimRewards>,
        compound: bool,
        expected_revision: Option<u64>,
    ) -> Result<ClaimReceipt> {
        instructions::claim::handler(ctx, compound, expected_revision)
    }

    /// Claimable reward of a position at the current clock
    pub fn preview_rewards(ctx: Context<PreviewRewards>) -> Result<u64> {
        instructions::preview_rewards::handler(ctx)
    }
}
