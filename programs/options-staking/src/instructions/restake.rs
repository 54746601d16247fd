use anchor_lang::prelude::*;
use crate::engine::StakingStateMachine;
use crate::events::OptionRestaked;
use crate::state::{PoolLedger, PositionRecord, POOL_LEDGER_SEED, POSITION_SEED};

#[derive(Accounts)]
pub struct Restake<'info> {
    #[account(
        mut,
        seeds = [POOL_LEDGER_SEED, pool_ledger.reward_mint.as_ref()],
        bump = pool_ledger.bump
    )]
    pub pool_ledger: Account<'info, PoolLedger>,
    
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

pub fn handler(ctx: Context<Restake>, expected_revision: Option<u64>) -> Result<u64> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let position_key = ctx.accounts.position.key();
    let pool_key = ctx.accounts.pool_ledger.key();
    
    let mut machine = StakingStateMachine::new(&mut ctx.accounts.pool_ledger, pool_key, clock.unix_timestamp);
    let reward_accrued = machine.restake(owner, &mut ctx.accounts.position, expected_revision)?;
    
    let position = &ctx.accounts.position;
    emit!(OptionRestaked {
        owner,
        position: position_key,
        reward_accrued,
        unlock_at: position.unlock_at,
        timestamp: clock.unix_timestamp,
    });
    
    msg!("Restaked position {}", position_key);
    msg!("Carried reward: {}, new unlock at: {}", reward_accrued, position.unlock_at);
    
    Ok(reward_accrued)
}
