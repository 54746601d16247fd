use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program::invoke_signed, system_instruction};
use crate::engine::{check_batch, StakeTerms, StakingStateMachine};
use crate::errors::StakingError;
use crate::events::OptionStaked;
use crate::state::{
    GlobalConfig, OptionLock, OptionType, PoolLedger, PositionRecord, UserLedger,
    GLOBAL_CONFIG_SEED, OPTION_LOCK_SEED, POOL_LEDGER_SEED, POSITION_SEED, USER_LEDGER_SEED,
};

/// One option of a batch stake
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct BatchStakeEntry {
    pub option_ref: Pubkey,
    pub lock_period: i64,
    pub option_type: OptionType,
}

/// Stakes several options in one transaction.
///
/// `remaining_accounts` carries an `(option_lock, position)` pair per entry,
/// in entry order. Option locks are created when missing.
#[derive(Accounts)]
pub struct StakeBatch<'info> {
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
    
    #[account(mut)]
    pub owner: Signer<'info>,
    
    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, StakeBatch<'info>>,
    entries: Vec<BatchStakeEntry>,
) -> Result<Vec<Pubkey>> {
    require!(
        ctx.remaining_accounts.len() == entries.len() * 2,
        StakingError::InvalidBatch
    );
    
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let pool_key = ctx.accounts.pool_ledger.key();
    let program_id = ctx.program_id;
    let terms: Vec<StakeTerms> = entries
        .iter()
        .map(|entry| StakeTerms {
            owner,
            option_ref: entry.option_ref,
            lock_period: entry.lock_period,
            option_type: entry.option_type,
        })
        .collect();
    
    let user_ledger: &mut UserLedger = &mut ctx.accounts.user_ledger;
    user_ledger.bump = ctx.bumps.user_ledger;
    check_batch(user_ledger, &terms)?;
    
    let payer = ctx.accounts.owner.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let mut machine = StakingStateMachine::new(&mut ctx.accounts.pool_ledger, pool_key, clock.unix_timestamp);
    let mut staked = Vec::with_capacity(terms.len());
    
    for (term, pair) in terms.iter().zip(ctx.remaining_accounts.chunks_exact(2)) {
        let (lock_info, position_info) = (&pair[0], &pair[1]);
        
        let (lock_key, lock_bump) = Pubkey::find_program_address(
            &[OPTION_LOCK_SEED, term.option_ref.as_ref()],
            program_id,
        );
        require_keys_eq!(*lock_info.key, lock_key, StakingError::PositionMismatch);
        let mut option_lock = if lock_info.data_is_empty() {
            create_record(
                &payer,
                lock_info,
                &system_program,
                OptionLock::SIZE,
                &[OPTION_LOCK_SEED, term.option_ref.as_ref(), &[lock_bump]],
                program_id,
            )?;
            OptionLock {
                bump: lock_bump,
                ..Default::default()
            }
        } else {
            require_keys_eq!(*lock_info.owner, *program_id, StakingError::PositionMismatch);
            OptionLock::try_deserialize(&mut &lock_info.try_borrow_data()?[..])?
        };
        
        let stake_index = option_lock.stake_count.to_le_bytes();
        let (position_key, position_bump) = Pubkey::find_program_address(
            &[POSITION_SEED, term.option_ref.as_ref(), &stake_index],
            program_id,
        );
        require_keys_eq!(*position_info.key, position_key, StakingError::PositionMismatch);
        require!(position_info.data_is_empty(), StakingError::AlreadyStaked);
        
        let mut position = PositionRecord {
            bump: position_bump,
            ..Default::default()
        };
        machine.stake(user_ledger, &mut option_lock, position_key, &mut position, *term)?;
        
        create_record(
            &payer,
            position_info,
            &system_program,
            PositionRecord::SIZE,
            &[POSITION_SEED, term.option_ref.as_ref(), &stake_index, &[position_bump]],
            program_id,
        )?;
        write_record(lock_info, &option_lock)?;
        write_record(position_info, &position)?;
        
        staked.push((position_key, *term, position.unlock_at));
    }
    
    let config = &mut ctx.accounts.global_config;
    config.total_positions = config.total_positions.saturating_add(staked.len() as u64);
    
    let pool_total_staked = ctx.accounts.pool_ledger.total_staked;
    for (position_key, term, unlock_at) in staked.iter() {
        emit!(OptionStaked {
            owner,
            pool: pool_key,
            position: *position_key,
            option_ref: term.option_ref,
            option_type: term.option_type,
            lock_period: term.lock_period,
            unlock_at: *unlock_at,
            pool_total_staked,
            timestamp: clock.unix_timestamp,
        });
    }
    
    msg!("Batch staked {} options", staked.len());
    msg!("Pool total staked: {}", pool_total_staked);
    
    Ok(staked.into_iter().map(|(position_key, _, _)| position_key).collect())
}

/// Allocates a program-owned PDA funded by `payer`
fn create_record<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    space: usize,
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<()> {
    let lamports = Rent::get()?.minimum_balance(space);
    let create_ix = system_instruction::create_account(
        payer.key,
        target.key,
        lamports,
        space as u64,
        program_id,
    );
    invoke_signed(
        &create_ix,
        &[payer.clone(), target.clone(), system_program.clone()],
        &[seeds],
    )?;
    Ok(())
}

fn write_record<T: AccountSerialize>(info: &AccountInfo, record: &T) -> Result<()> {
    let mut data = info.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data;
    record.try_serialize(&mut writer)
}
