use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::errors::StakingError;
use crate::events::PoolCreated;
use crate::state::{
    GlobalConfig, PayoutMode, PoolLedger, PoolPolicy, GLOBAL_CONFIG_SEED, POOL_AUTHORITY_SEED,
    POOL_LEDGER_SEED,
};

#[derive(Accounts)]
pub struct CreatePool<'info> {
    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED],
        bump = global_config.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub global_config: Account<'info, GlobalConfig>,
    
    #[account(
        init,
        payer = authority,
        space = PoolLedger::SIZE,
        seeds = [POOL_LEDGER_SEED, reward_mint.key().as_ref()],
        bump
    )]
    pub pool_ledger: Box<Account<'info, PoolLedger>>,
    
    /// CHECK: PDA that signs reward mints and reserve transfers; holds no data
    #[account(
        seeds = [POOL_AUTHORITY_SEED, pool_ledger.key().as_ref()],
        bump
    )]
    pub pool_authority: UncheckedAccount<'info>,
    
    /// Reward asset of the pool
    #[account(mint::token_program = token_program)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,
    
    /// Funded reserve, required when paying out by transfer
    pub reward_reserve: Option<Box<InterfaceAccount<'info, TokenAccount>>>,
    
    #[account(mut)]
    pub authority: Signer<'info>,
    
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<CreatePool>,
    policy: PoolPolicy,
    payout_mode: PayoutMode,
) -> Result<()> {
    let authority_key = ctx.accounts.pool_authority.key();
    let reward_mint_key = ctx.accounts.reward_mint.key();
    
    let reward_reserve = match payout_mode {
        PayoutMode::Mint => {
            require!(
                ctx.accounts.reward_mint.mint_authority == COption::Some(authority_key),
                StakingError::InvalidRewardAccount
            );
            Pubkey::default()
        }
        PayoutMode::Reserve => {
            let reserve = ctx
                .accounts
                .reward_reserve
                .as_ref()
                .ok_or(StakingError::MissingRewardReserve)?;
            require_keys_eq!(reserve.mint, reward_mint_key, StakingError::InvalidRewardAccount);
            require_keys_eq!(reserve.owner, authority_key, StakingError::InvalidRewardAccount);
            reserve.key()
        }
    };
    
    let pool_key = ctx.accounts.pool_ledger.key();
    let pool = &mut ctx.accounts.pool_ledger;
    let config = &mut ctx.accounts.global_config;
    let clock = Clock::get()?;
    
    pool.apply_policy(&policy)?;
    pool.reward_mint = reward_mint_key;
    pool.admin = config.authority;
    pool.authority = authority_key;
    pool.authority_bump = ctx.bumps.pool_authority;
    pool.reward_reserve = reward_reserve;
    pool.payout_mode = payout_mode;
    pool.total_staked = 0;
    pool.total_positions = 0;
    pool.total_rewards_paid = 0;
    pool.total_rewards_compounded = 0;
    pool.total_penalties = 0;
    pool.paused = false;
    pool.created_at = clock.unix_timestamp;
    pool.bump = ctx.bumps.pool_ledger;
    
    config.total_pools = config.total_pools.saturating_add(1);
    
    emit!(PoolCreated {
        pool: pool_key,
        reward_mint: reward_mint_key,
        authority: authority_key,
        payout_mode,
        policy,
        timestamp: clock.unix_timestamp,
    });
    
    msg!("Created options staking pool for reward mint: {}", reward_mint_key);
    msg!("Payout mode: {:?}, reward rate: {}", payout_mode, policy.reward_rate);
    msg!(
        "Penalty: {} bps, call weight: {} bps, put weight: {} bps",
        policy.penalty_bps,
        policy.call_weight_bps,
        policy.put_weight_bps
    );
    
    Ok(())
}
