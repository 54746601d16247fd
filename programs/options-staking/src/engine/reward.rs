//! Reward accrual, penalty and compounding math.
//!
//! Everything here is pure: callers hand in the records and the clock value
//! and decide what to commit.

use anchor_lang::prelude::*;

use crate::errors::StakingError;
use crate::state::{PoolLedger, PositionRecord, BPS_DENOMINATOR};

/// `reward_rate` is expressed per this many units of stake base
pub const RATE_PRECISION: u128 = 1_000_000_000;

pub const SECONDS_PER_MONTH: i64 = 30 * 24 * 60 * 60;

/// Tenure bonus stops growing after this many full months
pub const MAX_TENURE_BONUS_MONTHS: i64 = 6;

/// Result of splitting an amount under the early-unstake penalty
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PenaltySplit {
    pub kept: u64,
    pub forfeited: u64,
}

impl PenaltySplit {
    pub fn none(amount: u64) -> Self {
        Self {
            kept: amount,
            forfeited: 0,
        }
    }
}

/// Reward multiplier after `tenure` seconds in the current term: 1 + full months, capped
pub fn tenure_multiplier(tenure: i64) -> u64 {
    let months = tenure.max(0) / SECONDS_PER_MONTH;
    1 + months.min(MAX_TENURE_BONUS_MONTHS) as u64
}

/// Seconds in `[from, to)` weighted by the tenure multiplier in effect at each second.
/// Walks month boundaries, so at most `MAX_TENURE_BONUS_MONTHS + 1` segments.
pub fn tenure_weighted_seconds(staked_at: i64, from: i64, to: i64) -> Result<u128> {
    let mut total: u128 = 0;
    let mut cursor = from.max(staked_at);

    while cursor < to {
        let tenure = cursor
            .checked_sub(staked_at)
            .ok_or(StakingError::Overflow)?;
        let months = tenure / SECONDS_PER_MONTH;

        let segment_end = if months >= MAX_TENURE_BONUS_MONTHS {
            to
        } else {
            (months + 1)
                .checked_mul(SECONDS_PER_MONTH)
                .and_then(|offset| staked_at.checked_add(offset))
                .ok_or(StakingError::Overflow)?
                .min(to)
        };

        let seconds = segment_end
            .checked_sub(cursor)
            .ok_or(StakingError::Overflow)? as u128;
        total = seconds
            .checked_mul(tenure_multiplier(tenure) as u128)
            .and_then(|weighted| total.checked_add(weighted))
            .ok_or(StakingError::Overflow)?;

        cursor = segment_end;
    }

    Ok(total)
}

/// Reward earned since the position's last checkpoint, truncated toward zero.
///
/// `base * rate * weighted_seconds * type_weight / (RATE_PRECISION * BPS)`
/// where `base` is the per-option principal plus everything compounded so far.
/// The window is split at the pool's last rate-tier change: seconds before it
/// earn `prior_reward_rate`, seconds after it the current effective rate.
/// Unlocked positions earn nothing.
pub fn accrue(position: &PositionRecord, pool: &PoolLedger, now: i64) -> Result<u64> {
    let reward = accrue_wide(position, pool, now)?;
    u64::try_from(reward).map_err(|_| error!(StakingError::Overflow))
}

fn accrue_wide(position: &PositionRecord, pool: &PoolLedger, now: i64) -> Result<u128> {
    if !position.locked {
        return Ok(0);
    }

    let from = position.accrual_start();
    if now <= from {
        return Ok(0);
    }

    let split_at = pool.rate_changed_at.clamp(from, now);
    let before = tenure_weighted_seconds(position.staked_at, from, split_at)?;
    let after = tenure_weighted_seconds(position.staked_at, split_at, now)?;
    let rate_seconds = (pool.prior_reward_rate as u128)
        .checked_mul(before)
        .and_then(|prior| {
            (pool.effective_reward_rate() as u128)
                .checked_mul(after)
                .and_then(|current| current.checked_add(prior))
        })
        .ok_or(StakingError::Overflow)?;

    let base = (pool.principal_per_option as u128)
        .checked_add(position.compounded_amount as u128)
        .ok_or(StakingError::Overflow)?;
    let weight = pool.type_weight_bps(position.option_type) as u128;

    let numerator = base
        .checked_mul(rate_seconds)
        .and_then(|v| v.checked_mul(weight))
        .ok_or(StakingError::Overflow)?;
    Ok(numerator / (RATE_PRECISION * BPS_DENOMINATOR as u128))
}

/// Unclaimed reward as of `now`: the checkpointed balance plus fresh accrual
pub fn claimable(position: &PositionRecord, pool: &PoolLedger, now: i64) -> Result<u64> {
    let pending = accrue(position, pool, now)?;
    position
        .reward_accrued
        .checked_add(pending)
        .ok_or_else(|| error!(StakingError::Overflow))
}

/// Like `claimable`, but clamps at `u64::MAX` instead of failing.
/// Exits use this so an oversized reward can never pin a position in place.
pub fn claimable_saturating(position: &PositionRecord, pool: &PoolLedger, now: i64) -> u64 {
    let pending = accrue_wide(position, pool, now)
        .ok()
        .and_then(|reward| u64::try_from(reward).ok())
        .unwrap_or(u64::MAX);
    position.reward_accrued.saturating_add(pending)
}

/// `amount * (1 - penalty)`, floored at zero
pub fn apply_penalty(amount: u64, penalty_bps: u16) -> PenaltySplit {
    let keep_bps = BPS_DENOMINATOR.saturating_sub(penalty_bps as u64);
    let kept = (amount as u128 * keep_bps as u128 / BPS_DENOMINATOR as u128) as u64;
    PenaltySplit {
        kept,
        forfeited: amount - kept,
    }
}

/// Folds `amount` into the stake base and clears the unclaimed balance.
/// Leaves the position untouched on overflow.
pub fn compound(position: &mut PositionRecord, amount: u64) -> Result<()> {
    let compounded = position
        .compounded_amount
        .checked_add(amount)
        .ok_or(StakingError::Overflow)?;
    position.compounded_amount = compounded;
    position.reward_accrued = 0;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_utils::*;
    use crate::state::OptionType;
    use proptest::prelude::*;

    #[test]
    fn test_zero_elapsed_accrues_nothing() {
        let pool = pool();
        let position = locked_position(OptionType::Call, T0, 60);
        assert_eq!(accrue(&position, &pool, T0).unwrap(), 0);
        assert_eq!(accrue(&position, &pool, T0 - 10).unwrap(), 0);
    }

    #[test]
    fn test_linear_accrual_in_first_month() {
        let pool = pool();
        let position = locked_position(OptionType::Call, T0, 60);
        assert_eq!(accrue(&position, &pool, T0 + 1).unwrap(), CALL_REWARD_PER_SECOND);
        assert_eq!(accrue(&position, &pool, T0 + 30).unwrap(), 30 * CALL_REWARD_PER_SECOND);
    }

    #[test]
    fn test_put_weight_applies() {
        let pool = pool();
        let put = locked_position(OptionType::Put, T0, 60);
        assert_eq!(accrue(&put, &pool, T0 + 10).unwrap(), 10 * PUT_REWARD_PER_SECOND);
    }

    #[test]
    fn test_accrual_starts_at_checkpoint() {
        let pool = pool();
        let mut position = locked_position(OptionType::Call, T0, 60);
        position.last_accrual_at = T0 + 20;
        assert_eq!(accrue(&position, &pool, T0 + 30).unwrap(), 10 * CALL_REWARD_PER_SECOND);
    }

    #[test]
    fn test_unlocked_position_accrues_nothing() {
        let pool = pool();
        let mut position = locked_position(OptionType::Call, T0, 60);
        position.locked = false;
        assert_eq!(accrue(&position, &pool, T0 + 1_000).unwrap(), 0);
    }

    #[test]
    fn test_compounded_amount_grows_base() {
        let pool = pool();
        let mut position = locked_position(OptionType::Call, T0, 60);
        position.compounded_amount = pool.principal_per_option;
        assert_eq!(accrue(&position, &pool, T0 + 10).unwrap(), 20 * CALL_REWARD_PER_SECOND);
    }

    #[test]
    fn test_accrual_truncates() {
        let mut pool = pool();
        pool.principal_per_option = 1;
        let position = locked_position(OptionType::Call, T0, 60);
        // 1 * 1_000 * 999_999 * 10_000 / 1e13 = 0.999999
        assert_eq!(accrue(&position, &pool, T0 + 999_999).unwrap(), 0);
        assert_eq!(accrue(&position, &pool, T0 + 1_000_000).unwrap(), 1);
    }

    #[test]
    fn test_tenure_multiplier_steps_and_caps() {
        assert_eq!(tenure_multiplier(0), 1);
        assert_eq!(tenure_multiplier(SECONDS_PER_MONTH - 1), 1);
        assert_eq!(tenure_multiplier(SECONDS_PER_MONTH), 2);
        assert_eq!(tenure_multiplier(6 * SECONDS_PER_MONTH), 7);
        assert_eq!(tenure_multiplier(40 * SECONDS_PER_MONTH), 7);
        assert_eq!(tenure_multiplier(-5), 1);
    }

    #[test]
    fn test_tenure_weighted_seconds_across_boundary() {
        let from = T0 + SECONDS_PER_MONTH - 10;
        let to = T0 + SECONDS_PER_MONTH + 10;
        // 10s at 1x then 10s at 2x
        assert_eq!(tenure_weighted_seconds(T0, from, to).unwrap(), 30);
    }

    #[test]
    fn test_tenure_weighted_seconds_full_span() {
        let to = T0 + 8 * SECONDS_PER_MONTH;
        let month = SECONDS_PER_MONTH as u128;
        // months 0..6 at 1x..6x, then two months at the 7x cap
        let expected = month * (1 + 2 + 3 + 4 + 5 + 6) + 2 * month * 7;
        assert_eq!(tenure_weighted_seconds(T0, T0, to).unwrap(), expected);
    }

    #[test]
    fn test_claimable_adds_checkpointed_balance() {
        let pool = pool();
        let mut position = locked_position(OptionType::Call, T0, 60);
        position.reward_accrued = 7;
        assert_eq!(
            claimable(&position, &pool, T0 + 2).unwrap(),
            7 + 2 * CALL_REWARD_PER_SECOND
        );
    }

    #[test]
    fn test_apply_penalty() {
        assert_eq!(apply_penalty(1_000, 2_500), PenaltySplit { kept: 750, forfeited: 250 });
        assert_eq!(apply_penalty(1_000, 0), PenaltySplit::none(1_000));
        assert_eq!(apply_penalty(1_000, 10_000), PenaltySplit { kept: 0, forfeited: 1_000 });
        assert_eq!(apply_penalty(1_000, u16::MAX), PenaltySplit { kept: 0, forfeited: 1_000 });
        assert_eq!(apply_penalty(3, 5_000), PenaltySplit { kept: 1, forfeited: 2 });
    }

    #[test]
    fn test_compound_moves_balance_into_base() {
        let mut position = locked_position(OptionType::Call, T0, 60);
        position.reward_accrued = 500;
        position.compounded_amount = 100;
        compound(&mut position, 500).unwrap();
        assert_eq!(position.compounded_amount, 600);
        assert_eq!(position.reward_accrued, 0);
    }

    #[test]
    fn test_compound_overflow_leaves_position() {
        let mut position = locked_position(OptionType::Call, T0, 60);
        position.reward_accrued = 5;
        position.compounded_amount = u64::MAX;
        assert_error(compound(&mut position, 5), StakingError::Overflow);
        assert_eq!(position.compounded_amount, u64::MAX);
        assert_eq!(position.reward_accrued, 5);
    }

    #[test]
    fn test_accrual_splits_at_rate_tier_change() {
        let mut pool = pool();
        pool.crowding_threshold = 1;
        pool.crowded_reward_rate = 500;
        pool.total_staked = 1;
        pool.prior_reward_rate = 1_000;
        pool.rate_changed_at = T0 + 10;
        let position = locked_position(OptionType::Call, T0, 60);

        // 10s at the full rate, then 10s at half
        assert_eq!(
            accrue(&position, &pool, T0 + 20).unwrap(),
            10 * CALL_REWARD_PER_SECOND + 10 * CALL_REWARD_PER_SECOND / 2
        );
    }

    #[test]
    fn test_rate_change_before_checkpoint_uses_current_rate() {
        let mut pool = pool();
        pool.crowding_threshold = 1;
        pool.crowded_reward_rate = 500;
        pool.total_staked = 1;
        pool.prior_reward_rate = 1_000;
        pool.rate_changed_at = T0 - 100;
        let position = locked_position(OptionType::Call, T0, 60);

        assert_eq!(accrue(&position, &pool, T0 + 10).unwrap(), 5 * CALL_REWARD_PER_SECOND);
    }

    #[test]
    fn test_saturating_claimable_clamps_oversized_reward() {
        let mut pool = pool();
        pool.reward_rate = 1_000_000_000_000;
        pool.principal_per_option = u64::MAX;
        let position = locked_position(OptionType::Put, T0, 60);
        let later = T0 + 8 * SECONDS_PER_MONTH;

        assert_error(accrue(&position, &pool, later), StakingError::Overflow);
        assert_eq!(claimable_saturating(&position, &pool, later), u64::MAX);

        let normal = crate::engine::test_utils::pool();
        assert_eq!(
            claimable_saturating(&position, &normal, T0 + 10),
            claimable(&position, &normal, T0 + 10).unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_accrue_is_monotonic(
            a in 0i64..(10 * SECONDS_PER_MONTH),
            b in 0i64..(10 * SECONDS_PER_MONTH),
            compounded in 0u64..1_000_000_000_000,
        ) {
            let pool = pool();
            let mut position = locked_position(OptionType::Put, T0, 60);
            position.compounded_amount = compounded;
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let r_early = accrue(&position, &pool, T0 + early).unwrap();
            let r_late = accrue(&position, &pool, T0 + late).unwrap();
            prop_assert!(r_early <= r_late);
        }

        #[test]
        fn prop_penalty_never_exceeds_amount(amount in any::<u64>(), bps in 0u16..=10_000) {
            let split = apply_penalty(amount, bps);
            prop_assert!(split.kept <= amount);
            prop_assert_eq!(split.kept + split.forfeited, amount);
        }

        #[test]
        fn prop_compounded_base_earns_more(
            extra in 1_000_000u64..1_000_000_000_000,
            elapsed in 1i64..(3 * SECONDS_PER_MONTH),
        ) {
            let pool = pool();
            let plain = locked_position(OptionType::Call, T0, 60);
            let mut grown = locked_position(OptionType::Call, T0, 60);
            grown.compounded_amount = extra;
            let plain_reward = accrue(&plain, &pool, T0 + elapsed).unwrap();
            let grown_reward = accrue(&grown, &pool, T0 + elapsed).unwrap();
            prop_assert!(grown_reward > plain_reward);
        }
    }
}
