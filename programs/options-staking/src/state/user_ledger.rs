use anchor_lang::prelude::*;

use crate::errors::StakingError;

pub const USER_LEDGER_SEED: &[u8] = b"user-ledger";

/// Active positions a single user may hold in one pool
pub const MAX_POSITIONS_PER_USER: usize = 16;

/// A user's positions and lifetime totals in a pool
/// PDA: ["user-ledger", pool, owner]
#[account]
#[derive(Default, Debug)]
pub struct UserLedger {
    /// Owner of this ledger
    pub owner: Pubkey,

    /// The pool this ledger belongs to
    pub pool: Pubkey,

    /// Currently locked positions, each at most once
    pub staked_positions: Vec<Pubkey>,

    /// Rewards paid out to this user
    pub total_claimed: u64,

    /// Rewards this user compounded
    pub total_compounded: u64,

    /// Rewards this user forfeited to penalties
    pub total_forfeited: u64,

    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl UserLedger {
    pub const SIZE: usize = 8 + // discriminator
        32 + // owner
        32 + // pool
        4 + 32 * MAX_POSITIONS_PER_USER + // staked_positions
        8 +  // total_claimed
        8 +  // total_compounded
        8 +  // total_forfeited
        1;   // bump

    pub fn contains(&self, position: &Pubkey) -> bool {
        self.staked_positions.contains(position)
    }

    pub fn has_room(&self) -> bool {
        self.staked_positions.len() < MAX_POSITIONS_PER_USER
    }

    pub fn insert(&mut self, position: Pubkey) -> Result<()> {
        require!(!self.contains(&position), StakingError::AlreadyStaked);
        require!(self.has_room(), StakingError::TooManyPositions);
        self.staked_positions.push(position);
        Ok(())
    }

    pub fn remove(&mut self, position: &Pubkey) -> Result<()> {
        let index = self
            .staked_positions
            .iter()
            .position(|key| key == position)
            .ok_or(StakingError::PositionMismatch)?;
        self.staked_positions.swap_remove(index);
        Ok(())
    }
}
