use anchor_lang::prelude::*;

pub const OPTION_LOCK_SEED: &[u8] = b"option-lock";

/// Marks an option reference as locked and numbers its positions.
/// The option contract itself is never read or written.
/// PDA: ["option-lock", option_ref]
#[account]
#[derive(Default, Debug)]
pub struct OptionLock {
    pub option_ref: Pubkey,

    /// Position currently holding the lock (default when idle)
    pub active_position: Pubkey,

    pub locked: bool,

    /// Positions ever opened for this option; seeds the next position PDA
    pub stake_count: u64,

    pub bump: u8,
}

impl OptionLock {
    pub const SIZE: usize = 8 + // discriminator
        32 + // option_ref
        32 + // active_position
        1 +  // locked
        8 +  // stake_count
        1;   // bump

    pub fn release(&mut self) {
        self.locked = false;
        self.active_position = Pubkey::default();
    }
}
