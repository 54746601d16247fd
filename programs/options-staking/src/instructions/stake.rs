use anchor_lang::prelude::*;
use crate::engine::{StakeTerms, StakingStateMachine};
use crate::events::OptionStaked;
use crate::state::{
    GlobalConfig, OptionLock, OptionType, PoolLedger, PositionRecord, UserLedger,
    GLOBAL_CONFIG_SEED, OPTION_LOCK_SEED, POOL_LEDGER_SEED, POSITION_SEED, USER_LEDGER_SEED,
};

#[derive(Accounts)]
#[instruction(option_ref: Pubkey)]
pub struct Stake<'info> {
    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED],
        bump = global_config.bump
    )]
    pub global_config: Account<'info, GlobalConfig>,
    
    #[account(
        mut,
        seeds = [POOL_LEDGER_SEED, pool_ledger.reward_mint.as_ref()],
        bump = pool_ledger.bump
    )]
    pub pool_ledger: Account<'info, PoolLedger>,
    
    #[account(
        init_if_needed,
        payer = owner,
        space = UserLedger::SIZE,
        seeds = [USER_LEDGER_SEED, pool_ledger.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub user_ledger: Account<'info, UserLedger>,
    
    #[account(
        init_if_needed,
        payer = owner,
        space = OptionLock::SIZE,
        seeds = [OPTION_LOCK_SEED, option_ref.as_ref()],
        bump
    )]
    pub option_lock: Account<'info, OptionLock>,
    
    #[account(
        init,
        payer = owner,
        space = PositionRecord::SIZE,
        seeds = [
            POSITION_SEED,
            option_ref.as_ref(),
            option_lock.stake_count.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub position: Account<'info, PositionRecord>,
    
    #[account(mut)]
    pub owner: Signer<'info>,
    
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<Stake>,
    option_ref: Pubkey,
    lock_period: i64,
    option_type: OptionType,
) -> Result<Pubkey> {
    let pool_key = ctx.accounts.pool_ledger.key();
    let position_key = ctx.accounts.position.key();
    let owner = ctx.accounts.owner.key();
    let clock = Clock::get()?;
    
    let user_ledger = &mut ctx.accounts.user_ledger;
    let option_lock = &mut ctx.accounts.option_lock;
    let position = &mut ctx.accounts.position;
    user_ledger.bump = ctx.bumps.user_ledger;
    option_lock.bump = ctx.bumps.option_lock;
    position.bump = ctx.bumps.position;
    
    let terms = StakeTerms {
        owner,
        option_ref,
        lock_period,
        option_type,
    };
    let mut machine = StakingStateMachine::new(&mut ctx.accounts.pool_ledger, pool_key, clock.unix_timestamp);
    machine.stake(user_ledger, option_lock, position_key, position, terms)?;
    
    let config = &mut ctx.accounts.global_config;
    config.total_positions = config.total_positions.saturating_add(1);
    
    let pool = &ctx.accounts.pool_ledger;
    emit!(OptionStaked {
        owner,
        pool: pool_key,
        position: position_key,
        option_ref,
        option_type,
        lock_period,
        unlock_at: position.unlock_at,
        pool_total_staked: pool.total_staked,
        timestamp: clock.unix_timestamp,
    });
    
    msg!("Staked option {} as position {}", option_ref, position_key);
    msg!("Unlocks at: {}", position.unlock_at);
    msg!("Pool total staked: {}", pool.total_staked);
    
    Ok(position_key)
}
