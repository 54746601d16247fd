use anchor_lang::prelude::*;
use crate::engine::StakingStateMachine;
use crate::events::OptionUnstaked;
use crate::state::{
    OptionLock, PoolLedger, PositionRecord, UserLedger, OPTION_LOCK_SEED, POOL_LEDGER_SEED,
    POSITION_SEED, USER_LEDGER_SEED,
};

/// Accounts touched when a position leaves the locked state.
/// Shared by `unstake` and `emergency_unstake`.
#[derive(Accounts)]
pub struct Unstake<'info> {
    #[account(
        mut,
        seeds = [POOL_LEDGER_SEED, pool_ledger.reward_mint.as_ref()],
        bump = pool_ledger.bump
    )]
    pub pool_ledger: Account<'info, PoolLedger>,
    
    #[account(
        mut,
        seeds = [USER_LEDGER_SEED, pool_ledger.key().as_ref(), position.owner.as_ref()],
        bump = user_ledger.bump
    )]
    pub user_ledger: Account<'info, UserLedger>,
    
    #[account(
        mut,
        seeds = [OPTION_LOCK_SEED, position.option_ref.as_ref()],
        bump = option_lock.bump
    )]
    pub option_lock: Account<'info, OptionLock>,
    
    #[account(
        mut,
        seeds = [
            POSITION_SEED,
            position.option_ref.as_ref(),
            position.stake_index.to_le_bytes().as_ref()
        ],
        bump = position.bump
    )]
    pub position: Account<'info, PositionRecord>,
    
    pub owner: Signer<'info>,
}

pub fn handler(ctx: Context<Unstake>, early: bool, expected_revision: Option<u64>) -> Result<u64> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let position_key = ctx.accounts.position.key();
    let pool_key = ctx.accounts.pool_ledger.key();
    let forfeited_before = ctx.accounts.position.total_forfeited;
    
    let mut machine = StakingStateMachine::new(&mut ctx.accounts.pool_ledger, pool_key, clock.unix_timestamp);
    let reward_accrued = machine.unstake(
        owner,
        &mut ctx.accounts.user_ledger,
        &mut ctx.accounts.option_lock,
        position_key,
        &mut ctx.accounts.position,
        early,
        expected_revision,
    )?;
    
    let position = &ctx.accounts.position;
    let forfeited = position.total_forfeited.saturating_sub(forfeited_before);
    emit_unstaked(
        &ctx.accounts.pool_ledger,
        pool_key,
        position_key,
        position,
        reward_accrued,
        forfeited,
        false,
        clock.unix_timestamp,
    );
    
    msg!("Unstaked position {} (early: {})", position_key, early);
    msg!("Reward left to claim: {}, forfeited: {}", reward_accrued, forfeited);
    msg!("Pool total staked: {}", ctx.accounts.pool_ledger.total_staked);
    
    Ok(reward_accrued)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn emit_unstaked(
    pool: &PoolLedger,
    pool_key: Pubkey,
    position_key: Pubkey,
    position: &PositionRecord,
    reward_accrued: u64,
    forfeited: u64,
    emergency: bool,
    timestamp: i64,
) {
    emit!(OptionUnstaked {
        owner: position.owner,
        pool: pool_key,
        position: position_key,
        option_ref: position.option_ref,
        reward_accrued,
        forfeited,
        emergency,
        pool_total_staked: pool.total_staked,
        timestamp,
    });
}
