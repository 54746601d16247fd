use anchor_lang::prelude::*;
use crate::errors::StakingError;
use crate::events::PoolUpdated;
use crate::state::{PoolLedger, PoolPolicy, POOL_LEDGER_SEED};

/// Admin instruction to change reward policy or pause the pool.
/// Policy changes apply to reward not yet checkpointed on each position.
#[derive(Accounts)]
pub struct UpdatePool<'info> {
    #[account(
        mut,
        seeds = [POOL_LEDGER_SEED, pool_ledger.reward_mint.as_ref()],
        bump = pool_ledger.bump,
        has_one = admin @ StakingError::Unauthorized
    )]
    pub pool_ledger: Account<'info, PoolLedger>,
    
    pub admin: Signer<'info>,
}

pub fn handler(
    ctx: Context<UpdatePool>,
    policy: Option<PoolPolicy>,
    paused: Option<bool>,
) -> Result<()> {
    let pool_key = ctx.accounts.pool_ledger.key();
    let pool = &mut ctx.accounts.pool_ledger;
    let clock = Clock::get()?;
    
    if let Some(policy) = policy {
        pool.apply_policy(&policy)?;
        msg!("Reward rate: {}, penalty: {} bps", policy.reward_rate, policy.penalty_bps);
    }
    if let Some(paused) = paused {
        pool.paused = paused;
        msg!("Pool paused: {}", paused);
    }
    
    emit!(PoolUpdated {
        pool: pool_key,
        admin: pool.admin,
        policy: pool.policy(),
        paused: pool.paused,
        timestamp: clock.unix_timestamp,
    });
    
    msg!("Updated pool {}", pool_key);
    msg!("Total staked: {}", pool.total_staked);
    
    Ok(())
}
