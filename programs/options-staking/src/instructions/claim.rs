use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::engine::{ClaimReceipt, StakingStateMachine, TokenRewardMover};
use crate::errors::StakingError;
use crate::events::RewardsClaimed;
use crate::state::{
    PoolLedger, PositionRecord, UserLedger, POOL_AUTHORITY_SEED, POOL_LEDGER_SEED, POSITION_SEED,
    USER_LEDGER_SEED,
};

#[derive(Accounts)]
pub struct ClaimRewards<'info> {
    #[account(
        mut,
        seeds = [POOL_LEDGER_SEED, reward_mint.key().as_ref()],
        bump = pool_ledger.bump,
        has_one = reward_mint @ StakingError::InvalidRewardAccount
    )]
    pub pool_ledger: Box<Account<'info, PoolLedger>>,
    
    #[account(
        mut,
        seeds = [USER_LEDGER_SEED, pool_ledger.key().as_ref(), position.owner.as_ref()],
        bump = user_ledger.bump
    )]
    pub user_ledger: Box<Account<'info, UserLedger>>,
    
    #[account(
        mut,
        seeds = [
            POSITION_SEED,
            position.option_ref.as_ref(),
            position.stake_index.to_le_bytes().as_ref()
        ],
        bump = position.bump
    )]
    pub position: Box<Account<'info, PositionRecord>>,
    
    /// CHECK: PDA signer for reward mints and reserve transfers
    #[account(
        seeds = [POOL_AUTHORITY_SEED, pool_ledger.key().as_ref()],
        bump = pool_ledger.authority_bump
    )]
    pub pool_authority: UncheckedAccount<'info>,
    
    #[account(
        mut,
        mint::token_program = token_program
    )]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,
    
    /// Required when the pool pays out from a reserve
    #[account(mut)]
    pub reward_reserve: Option<Box<InterfaceAccount<'info, TokenAccount>>>,
    
    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = reward_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program
    )]
    pub owner_reward_account: Box<InterfaceAccount<'info, TokenAccount>>,
    
    #[account(mut)]
    pub owner: Signer<'info>,
    
    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<ClaimRewards>,
    compound: bool,
    expected_revision: Option<u64>,
) -> Result<ClaimReceipt> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let pool_key = ctx.accounts.pool_ledger.key();
    let position_key = ctx.accounts.position.key();
    
    let reward_reserve = match ctx.accounts.reward_reserve.as_ref() {
        Some(reserve) => {
            require_keys_eq!(
                reserve.key(),
                ctx.accounts.pool_ledger.reward_reserve,
                StakingError::InvalidRewardAccount
            );
            Some((reserve.to_account_info(), reserve.amount))
        }
        None => None,
    };
    
    let mut mover = TokenRewardMover {
        payout_mode: ctx.accounts.pool_ledger.payout_mode,
        token_program: ctx.accounts.token_program.to_account_info(),
        reward_mint: ctx.accounts.reward_mint.to_account_info(),
        reward_decimals: ctx.accounts.reward_mint.decimals,
        reward_reserve,
        destination: ctx.accounts.owner_reward_account.to_account_info(),
        authority: ctx.accounts.pool_authority.to_account_info(),
        pool_key,
        authority_bump: ctx.accounts.pool_ledger.authority_bump,
    };
    
    let mut machine = StakingStateMachine::new(&mut ctx.accounts.pool_ledger, pool_key, clock.unix_timestamp);
    let receipt = machine.claim(
        owner,
        &mut ctx.accounts.user_ledger,
        &mut ctx.accounts.position,
        compound,
        expected_revision,
        &mut mover,
    )?;
    
    let position = &ctx.accounts.position;
    emit!(RewardsClaimed {
        owner,
        pool: pool_key,
        position: position_key,
        amount: receipt.amount,
        mode: receipt.mode,
        compounded_amount: position.compounded_amount,
        timestamp: clock.unix_timestamp,
    });
    
    msg!("Claimed {} reward from position {}", receipt.amount, position_key);
    msg!("Mode: {:?}, compounded total: {}", receipt.mode, position.compounded_amount);
    
    Ok(receipt)
}
