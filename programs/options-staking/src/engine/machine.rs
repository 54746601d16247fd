//! Position lifecycle: stake → locked → unstaked.
//!
//! Every transition validates and computes all new values before the first
//! write, so a returned error never leaves a record half-updated. The value
//! movement of a claim is the last fallible step; ledgers are only written
//! after it succeeds.

use anchor_lang::prelude::*;

use crate::engine::mover::{ClaimMode, ClaimReceipt, ValueMover};
use crate::engine::reward::{self, PenaltySplit};
use crate::errors::StakingError;
use crate::state::*;

/// Parameters of a new position
#[derive(Clone, Copy, Debug)]
pub struct StakeTerms {
    pub owner: Pubkey,
    pub option_ref: Pubkey,
    pub lock_period: i64,
    pub option_type: OptionType,
}

/// How a position leaves the locked state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exit {
    /// `early` opts into the penalty; an on-time request needs an expired lock
    Requested { early: bool },
    /// Paused pool, expiry ignored, never penalized
    Emergency,
}

/// Applies transitions to the records of one pool at a fixed `now`
pub struct StakingStateMachine<'a> {
    pool: &'a mut PoolLedger,
    pool_key: Pubkey,
    now: i64,
}

impl<'a> StakingStateMachine<'a> {
    pub fn new(pool: &'a mut PoolLedger, pool_key: Pubkey, now: i64) -> Self {
        Self {
            pool,
            pool_key,
            now,
        }
    }

    /// Opens a locked position for `terms.option_ref`.
    /// `position` must be a freshly allocated record; its bump is kept.
    pub fn stake(
        &mut self,
        user: &mut UserLedger,
        option_lock: &mut OptionLock,
        position_key: Pubkey,
        position: &mut PositionRecord,
        terms: StakeTerms,
    ) -> Result<()> {
        require!(!self.pool.paused, StakingError::PoolPaused);
        require!(!option_lock.locked, StakingError::AlreadyStaked);
        require!(
            self.pool.accepts_lock_period(terms.lock_period),
            StakingError::InvalidLockPeriod
        );
        let unlock_at = self
            .now
            .checked_add(terms.lock_period)
            .ok_or(StakingError::InvalidLockPeriod)?;

        let fresh_lock = option_lock.option_ref == Pubkey::default();
        require!(
            fresh_lock || option_lock.option_ref == terms.option_ref,
            StakingError::PositionMismatch
        );
        let fresh_ledger = user.owner == Pubkey::default();
        require!(
            fresh_ledger || (user.owner == terms.owner && user.pool == self.pool_key),
            StakingError::PositionMismatch
        );
        require!(!user.contains(&position_key), StakingError::AlreadyStaked);
        require!(user.has_room(), StakingError::TooManyPositions);

        let total_staked = self
            .pool
            .total_staked
            .checked_add(POSITION_WEIGHT)
            .ok_or(StakingError::Overflow)?;
        let total_positions = self
            .pool
            .total_positions
            .checked_add(1)
            .ok_or(StakingError::Overflow)?;
        let stake_count = option_lock
            .stake_count
            .checked_add(1)
            .ok_or(StakingError::Overflow)?;

        user.insert(position_key)?;
        if fresh_ledger {
            user.owner = terms.owner;
            user.pool = self.pool_key;
        }

        *position = PositionRecord {
            owner: terms.owner,
            pool: self.pool_key,
            option_ref: terms.option_ref,
            option_type: terms.option_type,
            lock_period: terms.lock_period,
            staked_at: self.now,
            unlock_at,
            last_accrual_at: self.now,
            locked: true,
            stake_index: option_lock.stake_count,
            bump: position.bump,
            ..Default::default()
        };

        option_lock.option_ref = terms.option_ref;
        option_lock.active_position = position_key;
        option_lock.locked = true;
        option_lock.stake_count = stake_count;

        self.pool.set_total_staked(total_staked, self.now);
        self.pool.total_positions = total_positions;

        Ok(())
    }

    /// Leaves the locked state. Returns the reward left for a later claim.
    ///
    /// The penalty applies whenever the caller asks for an early exit, even
    /// once the lock has expired; an on-time exit before `unlock_at` fails.
    #[allow(clippy::too_many_arguments)]
    pub fn unstake(
        &mut self,
        caller: Pubkey,
        user: &mut UserLedger,
        option_lock: &mut OptionLock,
        position_key: Pubkey,
        position: &mut PositionRecord,
        early: bool,
        expected_revision: Option<u64>,
    ) -> Result<u64> {
        self.authorize(caller, position)?;
        check_revision(position, expected_revision)?;
        self.exit(
            user,
            option_lock,
            position_key,
            position,
            Exit::Requested { early },
        )
    }

    /// Penalty-free exit that ignores the lock; only while the pool is paused
    pub fn emergency_unstake(
        &mut self,
        caller: Pubkey,
        user: &mut UserLedger,
        option_lock: &mut OptionLock,
        position_key: Pubkey,
        position: &mut PositionRecord,
    ) -> Result<u64> {
        self.authorize(caller, position)?;
        require!(self.pool.paused, StakingError::PoolNotPaused);
        self.exit(user, option_lock, position_key, position, Exit::Emergency)
    }

    /// Starts a new lock term of the same length once the current one expired.
    /// Reward earned so far is checkpointed; pool weight is unchanged.
    pub fn restake(
        &mut self,
        caller: Pubkey,
        position: &mut PositionRecord,
        expected_revision: Option<u64>,
    ) -> Result<u64> {
        self.authorize(caller, position)?;
        check_revision(position, expected_revision)?;
        require!(position.locked, StakingError::NotLocked);
        require!(!self.pool.paused, StakingError::PoolPaused);
        require!(!position.is_early(self.now), StakingError::LockNotExpired);

        let accrued = reward::claimable(position, self.pool, self.now)?;
        let unlock_at = self
            .now
            .checked_add(position.lock_period)
            .ok_or(StakingError::InvalidLockPeriod)?;
        let revision = next_revision(position)?;

        position.reward_accrued = accrued;
        position.staked_at = self.now;
        position.last_accrual_at = self.now;
        position.unlock_at = unlock_at;
        position.revision = revision;

        Ok(accrued)
    }

    /// Pays out or compounds everything claimable on `position`.
    ///
    /// Compounding needs a locked position: a terminal one has no future
    /// accrual to grow. A failed value movement commits nothing.
    pub fn claim<M: ValueMover>(
        &mut self,
        caller: Pubkey,
        user: &mut UserLedger,
        position: &mut PositionRecord,
        compound: bool,
        expected_revision: Option<u64>,
        mover: &mut M,
    ) -> Result<ClaimReceipt> {
        self.authorize(caller, position)?;
        self.check_user_ledger(user, position)?;
        check_revision(position, expected_revision)?;
        require!(position.locked || !compound, StakingError::NotLocked);

        let amount = reward::claimable(position, self.pool, self.now)?;
        require!(amount > 0, StakingError::NothingToClaim);
        let revision = next_revision(position)?;
        let checkpoint = if position.locked {
            self.now
        } else {
            position.last_accrual_at
        };

        if compound {
            let pool_total = self
                .pool
                .total_rewards_compounded
                .checked_add(amount)
                .ok_or(StakingError::Overflow)?;
            let user_total = user
                .total_compounded
                .checked_add(amount)
                .ok_or(StakingError::Overflow)?;

            reward::compound(position, amount)?;
            position.last_accrual_at = checkpoint;
            position.revision = revision;
            self.pool.total_rewards_compounded = pool_total;
            user.total_compounded = user_total;

            return Ok(ClaimReceipt {
                amount,
                mode: ClaimMode::Compounded,
            });
        }

        let position_total = position
            .total_claimed
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let pool_total = self
            .pool
            .total_rewards_paid
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let user_total = user
            .total_claimed
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;

        mover.move_value(amount).map_err(|err| {
            msg!("Reward movement failed: {}", err);
            error!(StakingError::TransferFailed)
        })?;

        position.reward_accrued = 0;
        position.last_accrual_at = checkpoint;
        position.total_claimed = position_total;
        position.revision = revision;
        self.pool.total_rewards_paid = pool_total;
        user.total_claimed = user_total;

        Ok(ClaimReceipt {
            amount,
            mode: mover.mode(),
        })
    }

    fn exit(
        &mut self,
        user: &mut UserLedger,
        option_lock: &mut OptionLock,
        position_key: Pubkey,
        position: &mut PositionRecord,
        exit: Exit,
    ) -> Result<u64> {
        require!(position.locked, StakingError::NotLocked);
        self.check_user_ledger(user, position)?;
        require!(
            user.contains(&position_key),
            StakingError::PositionMismatch
        );
        require!(
            option_lock.locked && option_lock.active_position == position_key,
            StakingError::PositionMismatch
        );

        let penalize = match exit {
            Exit::Requested { early } => {
                require!(
                    early || !position.is_early(self.now),
                    StakingError::LockNotExpired
                );
                early
            }
            Exit::Emergency => false,
        };

        let unclaimed = reward::claimable_saturating(position, self.pool, self.now);
        let split = if penalize {
            reward::apply_penalty(unclaimed, self.pool.penalty_bps)
        } else {
            PenaltySplit::none(unclaimed)
        };

        let total_staked = self
            .pool
            .total_staked
            .checked_sub(POSITION_WEIGHT)
            .ok_or(StakingError::Overflow)?;
        let pool_penalties = self
            .pool
            .total_penalties
            .checked_add(split.forfeited)
            .ok_or(StakingError::Overflow)?;
        let user_forfeited = user
            .total_forfeited
            .checked_add(split.forfeited)
            .ok_or(StakingError::Overflow)?;
        let position_forfeited = position
            .total_forfeited
            .checked_add(split.forfeited)
            .ok_or(StakingError::Overflow)?;
        let revision = next_revision(position)?;

        user.remove(&position_key)?;
        user.total_forfeited = user_forfeited;
        option_lock.release();

        position.locked = false;
        position.reward_accrued = split.kept;
        position.last_accrual_at = self.now;
        position.unstaked_at = self.now;
        position.total_forfeited = position_forfeited;
        position.revision = revision;

        self.pool.set_total_staked(total_staked, self.now);
        self.pool.total_penalties = pool_penalties;

        Ok(split.kept)
    }

    fn authorize(&self, caller: Pubkey, position: &PositionRecord) -> Result<()> {
        require_keys_eq!(position.owner, caller, StakingError::Unauthorized);
        require_keys_eq!(position.pool, self.pool_key, StakingError::PositionMismatch);
        Ok(())
    }

    fn check_user_ledger(&self, user: &UserLedger, position: &PositionRecord) -> Result<()> {
        require!(
            user.owner == position.owner && user.pool == self.pool_key,
            StakingError::PositionMismatch
        );
        Ok(())
    }
}

/// Most options one batch may stake
pub const MAX_BATCH_STAKE: usize = 8;

/// Rejects a batch that could not be staked in full before any record is touched
pub fn check_batch(user: &UserLedger, terms: &[StakeTerms]) -> Result<()> {
    require!(
        !terms.is_empty() && terms.len() <= MAX_BATCH_STAKE,
        StakingError::InvalidBatch
    );
    for (index, entry) in terms.iter().enumerate() {
        require!(
            terms[..index]
                .iter()
                .all(|earlier| earlier.option_ref != entry.option_ref),
            StakingError::AlreadyStaked
        );
    }
    require!(
        user.staked_positions.len() + terms.len() <= MAX_POSITIONS_PER_USER,
        StakingError::TooManyPositions
    );
    Ok(())
}

fn check_revision(position: &PositionRecord, expected_revision: Option<u64>) -> Result<()> {
    if let Some(expected) = expected_revision {
        require!(
            position.revision == expected,
            StakingError::ConcurrentModification
        );
    }
    Ok(())
}

fn next_revision(position: &PositionRecord) -> Result<u64> {
    position
        .revision
        .checked_add(1)
        .ok_or_else(|| error!(StakingError::Overflow))
}
