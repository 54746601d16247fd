use anchor_lang::prelude::*;
use crate::engine::StakingStateMachine;
use crate::instructions::unstake::{emit_unstaked, Unstake};

/// Exit from a paused pool, ignoring the lock expiry and without penalty.
pub fn handler(ctx: Context<Unstake>) -> Result<u64> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let position_key = ctx.accounts.position.key();
    let pool_key = ctx.accounts.pool_ledger.key();
    
    let mut machine = StakingStateMachine::new(&mut ctx.accounts.pool_ledger, pool_key, clock.unix_timestamp);
    let reward_accrued = machine.emergency_unstake(
        owner,
        &mut ctx.accounts.user_ledger,
        &mut ctx.accounts.option_lock,
        position_key,
        &mut ctx.accounts.position,
    )?;
    
    emit_unstaked(
        &ctx.accounts.pool_ledger,
        pool_key,
        position_key,
        &ctx.accounts.position,
        reward_accrued,
        0,
        true,
        clock.unix_timestamp,
    );
    
    msg!("Emergency unstake of position {}", position_key);
    msg!("Reward left to claim: {}", reward_accrued);
    
    Ok(reward_accrued)
}
