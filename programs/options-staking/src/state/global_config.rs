use anchor_lang::prelude::*;

pub const GLOBAL_CONFIG_SEED: &[u8] = b"global-config";

/// Global configuration for the options staking program
/// PDA: ["global-config"]
#[account]
#[derive(Default)]
pub struct GlobalConfig {
    /// Program authority (can create pools)
    pub authority: Pubkey,

    /// Total number of pools created
    pub total_pools: u64,

    /// Total positions ever opened across all pools
    pub total_positions: u64,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

impl GlobalConfig {
    pub const SIZE: usize = 8 + // discriminator
        32 + // authority
        8 +  // total_pools
        8 +  // total_positions
        1 +  // bump
        32;  // reserved
}
