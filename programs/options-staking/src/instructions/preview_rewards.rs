use anchor_lang::prelude::*;
use crate::engine::reward;
use crate::state::{PoolLedger, PositionRecord, POOL_LEDGER_SEED, POSITION_SEED};
use crate::errors::StakingError;

/// Read-only view of what `claim_rewards` would pay at the current clock
#[derive(Accounts)]
pub struct PreviewRewards<'info> {
    #[account(
        seeds = [POOL_LEDGER_SEED, pool_ledger.reward_mint.as_ref()],
        bump = pool_ledger.bump
    )]
    pub pool_ledger: Account<'info, PoolLedger>,
    
    #[account(
        seeds = [
            POSITION_SEED,
            position.option_ref.as_ref(),
            position.stake_index.to_le_bytes().as_ref()
        ],
        bump = position.bump,
        constraint = position.pool == pool_ledger.key() @ StakingError::PositionMismatch
    )]
    pub position: Account<'info, PositionRecord>,
}

pub fn handler(ctx: Context<PreviewRewards>) -> Result<u64> {
    let clock = Clock::get()?;
    let claimable = reward::claimable(&ctx.accounts.position, &ctx.accounts.pool_ledger, clock.unix_timestamp)?;
    
    msg!("Claimable reward: {}", claimable);
    
    Ok(claimable)
}
