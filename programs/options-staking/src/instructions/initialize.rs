use anchor_lang::prelude::*;
use crate::state::{GlobalConfig, GLOBAL_CONFIG_SEED};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = authority,
        space = GlobalConfig::SIZE,
        seeds = [GLOBAL_CONFIG_SEED],
        bump
    )]
    pub global_config: Account<'info, GlobalConfig>,
    
    #[account(mut)]
    pub authority: Signer<'info>,
    
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let config = &mut ctx.accounts.global_config;
    
    config.authority = ctx.accounts.authority.key();
    config.total_pools = 0;
    config.total_positions = 0;
    config.bump = ctx.bumps.global_config;
    
    msg!("Initialized options staking config");
    msg!("Authority: {}", config.authority);
    
    Ok(())
}
