use anchor_lang::prelude::*;

use crate::errors::StakingError;
use crate::state::OptionType;

pub const POOL_LEDGER_SEED: &[u8] = b"pool-ledger";
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool-authority";

/// Basis point denominator shared by penalty and weight policies
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Upper bound for a single option type weight (5x)
pub const MAX_TYPE_WEIGHT_BPS: u16 = 50_000;

/// Every locked position contributes one unit to `total_staked`
pub const POSITION_WEIGHT: u64 = 1;

/// How claimed rewards leave the pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PayoutMode {
    /// Pool authority mints fresh reward supply
    #[default]
    Mint,
    /// Pool authority transfers from a funded reserve account
    Reserve,
}

/// Tunable reward policy of a pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolPolicy {
    /// Reward units per second per `RATE_PRECISION` units of stake base
    pub reward_rate: u64,
    /// Stake base a single option contributes before compounding
    pub principal_per_option: u64,
    /// Share of accrued reward forfeited on early unstake
    pub penalty_bps: u16,
    pub call_weight_bps: u16,
    pub put_weight_bps: u16,
    /// Longest accepted lock period in seconds (0 = unbounded)
    pub max_lock_period: i64,
    /// Pool size at which `crowded_reward_rate` takes over (0 = never)
    pub crowding_threshold: u64,
    /// Reduced rate paid while `total_staked >= crowding_threshold`
    pub crowded_reward_rate: u64,
}

impl PoolPolicy {
    pub fn validate(&self) -> Result<()> {
        require!(
            (self.penalty_bps as u64) <= BPS_DENOMINATOR,
            StakingError::InvalidPenaltyRatio
        );
        for weight in [self.call_weight_bps, self.put_weight_bps] {
            require!(
                weight > 0 && weight <= MAX_TYPE_WEIGHT_BPS,
                StakingError::InvalidTypeWeight
            );
        }
        require!(self.max_lock_period >= 0, StakingError::InvalidLockPeriod);
        require!(
            self.crowding_threshold == 0 || self.crowded_reward_rate <= self.reward_rate,
            StakingError::InvalidRewardRate
        );
        Ok(())
    }
}

/// Per-pool aggregate ledger
/// PDA: ["pool-ledger", reward_mint]
#[account]
#[derive(Default)]
pub struct PoolLedger {
    /// Reward asset paid out by this pool
    pub reward_mint: Pubkey,

    /// Pool administrator (may update policy and pause)
    pub admin: Pubkey,

    /// PDA permitted to move reward funds: ["pool-authority", pool]
    pub authority: Pubkey,

    /// Reserve token account used in `PayoutMode::Reserve`
    pub reward_reserve: Pubkey,

    pub payout_mode: PayoutMode,

    /// Weight of currently locked positions
    pub total_staked: u64,

    /// Positions ever opened in this pool
    pub total_positions: u64,

    pub reward_rate: u64,
    pub principal_per_option: u64,
    pub penalty_bps: u16,
    pub call_weight_bps: u16,
    pub put_weight_bps: u16,
    pub max_lock_period: i64,
    pub crowding_threshold: u64,
    pub crowded_reward_rate: u64,

    /// Rate in effect before the last tier change
    pub prior_reward_rate: u64,

    /// When the effective rate last changed tier; accrual before it uses `prior_reward_rate`
    pub rate_changed_at: i64,

    /// Rewards minted or transferred out historically
    pub total_rewards_paid: u64,

    /// Rewards folded back into positions historically
    pub total_rewards_compounded: u64,

    /// Rewards forfeited to early-unstake penalties historically
    pub total_penalties: u64,

    pub paused: bool,
    pub created_at: i64,
    pub authority_bump: u8,
    pub bump: u8,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

impl PoolLedger {
    pub const SIZE: usize = 8 + // discriminator
        32 + // reward_mint
        32 + // admin
        32 + // authority
        32 + // reward_reserve
        1 +  // payout_mode
        8 +  // total_staked
        8 +  // total_positions
        8 +  // reward_rate
        8 +  // principal_per_option
        2 +  // penalty_bps
        2 +  // call_weight_bps
        2 +  // put_weight_bps
        8 +  // max_lock_period
        8 +  // crowding_threshold
        8 +  // crowded_reward_rate
        8 +  // prior_reward_rate
        8 +  // rate_changed_at
        8 +  // total_rewards_paid
        8 +  // total_rewards_compounded
        8 +  // total_penalties
        1 +  // paused
        8 +  // created_at
        1 +  // authority_bump
        1 +  // bump
        32;  // reserved

    pub fn policy(&self) -> PoolPolicy {
        PoolPolicy {
            reward_rate: self.reward_rate,
            principal_per_option: self.principal_per_option,
            penalty_bps: self.penalty_bps,
            call_weight_bps: self.call_weight_bps,
            put_weight_bps: self.put_weight_bps,
            max_lock_period: self.max_lock_period,
            crowding_threshold: self.crowding_threshold,
            crowded_reward_rate: self.crowded_reward_rate,
        }
    }

    pub fn apply_policy(&mut self, policy: &PoolPolicy) -> Result<()> {
        policy.validate()?;
        self.reward_rate = policy.reward_rate;
        self.principal_per_option = policy.principal_per_option;
        self.penalty_bps = policy.penalty_bps;
        self.call_weight_bps = policy.call_weight_bps;
        self.put_weight_bps = policy.put_weight_bps;
        self.max_lock_period = policy.max_lock_period;
        self.crowding_threshold = policy.crowding_threshold;
        self.crowded_reward_rate = policy.crowded_reward_rate;
        // policy changes reach back to every position's last checkpoint
        self.prior_reward_rate = self.effective_reward_rate();
        Ok(())
    }

    /// Reward rate paid at a given pool size
    pub fn reward_rate_at(&self, total_staked: u64) -> u64 {
        if self.crowding_threshold > 0 && total_staked >= self.crowding_threshold {
            self.crowded_reward_rate
        } else {
            self.reward_rate
        }
    }

    pub fn effective_reward_rate(&self) -> u64 {
        self.reward_rate_at(self.total_staked)
    }

    /// Commits a new pool size. Crossing the crowding threshold records a
    /// rate checkpoint at `now`.
    pub fn set_total_staked(&mut self, total_staked: u64, now: i64) {
        let current = self.effective_reward_rate();
        if self.reward_rate_at(total_staked) != current {
            self.prior_reward_rate = current;
            self.rate_changed_at = now;
        }
        self.total_staked = total_staked;
    }

    /// Reward weight of an option type in basis points
    pub fn type_weight_bps(&self, option_type: OptionType) -> u16 {
        match option_type {
            OptionType::Call => self.call_weight_bps,
            OptionType::Put => self.put_weight_bps,
        }
    }

    pub fn accepts_lock_period(&self, lock_period: i64) -> bool {
        lock_period >= 0 && (self.max_lock_period == 0 || lock_period <= self.max_lock_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_utils::{assert_error, policy, pool};

    #[test]
    fn test_policy_rejects_penalty_over_full_reward() {
        let mut ledger = pool();
        let bad = PoolPolicy {
            penalty_bps: 10_001,
            ..policy()
        };
        assert_error(ledger.apply_policy(&bad), StakingError::InvalidPenaltyRatio);
        assert_eq!(ledger.policy(), policy());
    }

    #[test]
    fn test_policy_rejects_out_of_range_weights() {
        let mut ledger = pool();
        let zero_put = PoolPolicy {
            put_weight_bps: 0,
            ..policy()
        };
        assert_error(ledger.apply_policy(&zero_put), StakingError::InvalidTypeWeight);

        let heavy_call = PoolPolicy {
            call_weight_bps: MAX_TYPE_WEIGHT_BPS + 1,
            ..policy()
        };
        assert_error(ledger.apply_policy(&heavy_call), StakingError::InvalidTypeWeight);
    }

    #[test]
    fn test_apply_policy_replaces_reward_terms() {
        let mut ledger = pool();
        let updated = PoolPolicy {
            reward_rate: 2_000,
            penalty_bps: 0,
            max_lock_period: 86_400,
            ..policy()
        };
        ledger.apply_policy(&updated).unwrap();

        assert_eq!(ledger.policy(), updated);
        assert_eq!(ledger.type_weight_bps(OptionType::Put), 15_000);
    }

    #[test]
    fn test_policy_rejects_crowded_rate_above_base() {
        let mut ledger = pool();
        let bad = PoolPolicy {
            crowding_threshold: 10,
            crowded_reward_rate: 1_001,
            ..policy()
        };
        assert_error(ledger.apply_policy(&bad), StakingError::InvalidRewardRate);
    }

    #[test]
    fn test_crossing_threshold_records_rate_checkpoint() {
        let mut ledger = pool();
        ledger
            .apply_policy(&PoolPolicy {
                crowding_threshold: 2,
                crowded_reward_rate: 400,
                ..policy()
            })
            .unwrap();

        ledger.set_total_staked(1, 100);
        assert_eq!(ledger.effective_reward_rate(), 1_000);
        assert_eq!(ledger.rate_changed_at, 0);

        ledger.set_total_staked(2, 200);
        assert_eq!(ledger.effective_reward_rate(), 400);
        assert_eq!(ledger.prior_reward_rate, 1_000);
        assert_eq!(ledger.rate_changed_at, 200);

        ledger.set_total_staked(3, 300);
        assert_eq!(ledger.rate_changed_at, 200);

        ledger.set_total_staked(1, 400);
        assert_eq!(ledger.effective_reward_rate(), 1_000);
        assert_eq!(ledger.prior_reward_rate, 400);
        assert_eq!(ledger.rate_changed_at, 400);
    }

    #[test]
    fn test_lock_period_bounds() {
        let mut ledger = pool();
        assert!(ledger.accepts_lock_period(0));
        assert!(ledger.accepts_lock_period(i64::MAX));
        assert!(!ledger.accepts_lock_period(-1));

        ledger.max_lock_period = 3_600;
        assert!(ledger.accepts_lock_period(3_600));
        assert!(!ledger.accepts_lock_period(3_601));
    }
}
