use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, MintTo, TransferChecked};

use crate::errors::StakingError;
use crate::state::{PayoutMode, POOL_AUTHORITY_SEED};

/// How a claim left the pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimMode {
    Minted,
    Transferred,
    Compounded,
}

impl From<PayoutMode> for ClaimMode {
    fn from(mode: PayoutMode) -> Self {
        match mode {
            PayoutMode::Mint => ClaimMode::Minted,
            PayoutMode::Reserve => ClaimMode::Transferred,
        }
    }
}

/// Returned from `claim_rewards`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub amount: u64,
    pub mode: ClaimMode,
}

/// Capability to pay reward value out of a pool.
///
/// An implementation must either move the full amount or fail without
/// moving anything.
pub trait ValueMover {
    fn move_value(&mut self, amount: u64) -> Result<()>;

    fn mode(&self) -> ClaimMode;
}

/// Pays rewards with SPL tokens, signed by the pool authority PDA
pub struct TokenRewardMover<'info> {
    pub payout_mode: PayoutMode,
    pub token_program: AccountInfo<'info>,
    pub reward_mint: AccountInfo<'info>,
    pub reward_decimals: u8,
    /// Reserve account and its balance, required in `PayoutMode::Reserve`
    pub reward_reserve: Option<(AccountInfo<'info>, u64)>,
    pub destination: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
    pub pool_key: Pubkey,
    pub authority_bump: u8,
}

impl<'info> ValueMover for TokenRewardMover<'info> {
    fn move_value(&mut self, amount: u64) -> Result<()> {
        let pool_key = self.pool_key;
        let seeds = &[
            POOL_AUTHORITY_SEED,
            pool_key.as_ref(),
            &[self.authority_bump],
        ];
        let signer_seeds = &[&seeds[..]];

        match self.payout_mode {
            PayoutMode::Mint => {
                let cpi_accounts = MintTo {
                    mint: self.reward_mint.clone(),
                    to: self.destination.clone(),
                    authority: self.authority.clone(),
                };
                let cpi_ctx = CpiContext::new_with_signer(
                    self.token_program.clone(),
                    cpi_accounts,
                    signer_seeds,
                );
                token_interface::mint_to(cpi_ctx, amount)
            }
            PayoutMode::Reserve => {
                let (reserve, balance) = self
                    .reward_reserve
                    .as_ref()
                    .ok_or(StakingError::MissingRewardReserve)?;
                if *balance < amount {
                    msg!("Reserve holds {} but {} is owed", balance, amount);
                    return err!(StakingError::TransferFailed);
                }

                let cpi_accounts = TransferChecked {
                    from: reserve.clone(),
                    mint: self.reward_mint.clone(),
                    to: self.destination.clone(),
                    authority: self.authority.clone(),
                };
                let cpi_ctx = CpiContext::new_with_signer(
                    self.token_program.clone(),
                    cpi_accounts,
                    signer_seeds,
                );
                token_interface::transfer_checked(cpi_ctx, amount, self.reward_decimals)?;

                if let Some((_, balance)) = self.reward_reserve.as_mut() {
                    *balance -= amount;
                }
                Ok(())
            }
        }
    }

    fn mode(&self) -> ClaimMode {
        self.payout_mode.into()
    }
}
