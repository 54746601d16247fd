use anchor_lang::error::{Error, ERROR_CODE_OFFSET};
use anchor_lang::prelude::*;

use crate::engine::machine::{check_batch, StakeTerms, StakingStateMachine};
use crate::engine::mover::{ClaimMode, ValueMover};
use crate::errors::StakingError;
use crate::state::*;

pub const T0: i64 = 1_700_000_000;

/// Reward per second of a fresh call position under `policy()`
pub const CALL_REWARD_PER_SECOND: u64 = 1_000;
pub const PUT_REWARD_PER_SECOND: u64 = 1_500;

pub fn key(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

pub fn policy() -> PoolPolicy {
    PoolPolicy {
        reward_rate: 1_000,
        principal_per_option: 1_000_000_000,
        penalty_bps: 5_000,
        call_weight_bps: 10_000,
        put_weight_bps: 15_000,
        max_lock_period: 0,
        crowding_threshold: 0,
        crowded_reward_rate: 0,
    }
}

pub fn pool() -> PoolLedger {
    let mut pool = PoolLedger {
        reward_mint: key(200),
        admin: key(201),
        authority: key(202),
        created_at: T0,
        ..Default::default()
    };
    pool.apply_policy(&policy()).unwrap();
    pool
}

pub fn locked_position(option_type: OptionType, staked_at: i64, lock_period: i64) -> PositionRecord {
    PositionRecord {
        owner: key(1),
        pool: POOL_KEY,
        option_ref: key(100),
        option_type,
        lock_period,
        staked_at,
        unlock_at: staked_at + lock_period,
        last_accrual_at: staked_at,
        locked: true,
        ..Default::default()
    }
}

pub const POOL_KEY: Pubkey = Pubkey::new_from_array([210; 32]);

pub fn assert_error<T: std::fmt::Debug>(result: Result<T>, expected: StakingError) {
    let expected_code = expected as u32 + ERROR_CODE_OFFSET;
    match result {
        Err(Error::AnchorError(err)) => assert_eq!(
            err.error_code_number, expected_code,
            "expected {}, got {}",
            expected_code, err.error_name
        ),
        other => panic!("expected error code {}, got {:?}", expected_code, other),
    }
}

/// Records every movement; fails on demand
#[derive(Default)]
pub struct RecordingMover {
    pub moved: Vec<u64>,
    pub fail: bool,
}

impl ValueMover for RecordingMover {
    fn move_value(&mut self, amount: u64) -> Result<()> {
        if self.fail {
            return err!(StakingError::TransferFailed);
        }
        self.moved.push(amount);
        Ok(())
    }

    fn mode(&self) -> ClaimMode {
        ClaimMode::Minted
    }
}

/// Ledgers of one pool with one user and any number of options
pub struct Harness {
    pub pool: PoolLedger,
    pub user: UserLedger,
    pub locks: Vec<(Pubkey, OptionLock)>,
    pub positions: Vec<(Pubkey, PositionRecord)>,
    pub owner: Pubkey,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            pool: pool(),
            user: UserLedger::default(),
            locks: Vec::new(),
            positions: Vec::new(),
            owner: key(1),
        }
    }

    fn lock_index(&mut self, option_ref: Pubkey) -> usize {
        match self.locks.iter().position(|(key, _)| *key == option_ref) {
            Some(index) => index,
            None => {
                self.locks.push((option_ref, OptionLock::default()));
                self.locks.len() - 1
            }
        }
    }

    /// Stakes `option_ref` and returns the index of its position
    pub fn stake(
        &mut self,
        option_ref: Pubkey,
        lock_period: i64,
        option_type: OptionType,
        now: i64,
    ) -> Result<usize> {
        let lock_index = self.lock_index(option_ref);
        let mut position = PositionRecord::default();
        let position_key = Pubkey::new_from_array(position_seed(option_ref, self.locks[lock_index].1.stake_count));

        let terms = StakeTerms {
            owner: self.owner,
            option_ref,
            lock_period,
            option_type,
        };
        let mut machine = StakingStateMachine::new(&mut self.pool, POOL_KEY, now);
        machine.stake(
            &mut self.user,
            &mut self.locks[lock_index].1,
            position_key,
            &mut position,
            terms,
        )?;

        self.positions.push((position_key, position));
        Ok(self.positions.len() - 1)
    }

    /// Validates the whole batch, then stakes each entry in order
    pub fn stake_batch(
        &mut self,
        entries: &[(Pubkey, i64, OptionType)],
        now: i64,
    ) -> Result<Vec<usize>> {
        let terms: Vec<StakeTerms> = entries
            .iter()
            .map(|&(option_ref, lock_period, option_type)| StakeTerms {
                owner: self.owner,
                option_ref,
                lock_period,
                option_type,
            })
            .collect();
        check_batch(&self.user, &terms)?;
        terms
            .iter()
            .map(|t| self.stake(t.option_ref, t.lock_period, t.option_type, now))
            .collect()
    }

    pub fn unstake(&mut self, index: usize, early: bool, now: i64) -> Result<u64> {
        let (position_key, position) = &mut self.positions[index];
        let option_ref = position.option_ref;
        let lock_index = self
            .locks
            .iter()
            .position(|(key, _)| *key == option_ref)
            .unwrap();
        let mut machine = StakingStateMachine::new(&mut self.pool, POOL_KEY, now);
        machine.unstake(
            self.owner,
            &mut self.user,
            &mut self.locks[lock_index].1,
            *position_key,
            position,
            early,
            None,
        )
    }

    pub fn claim(
        &mut self,
        index: usize,
        compound: bool,
        now: i64,
        mover: &mut RecordingMover,
    ) -> Result<crate::engine::mover::ClaimReceipt> {
        let position = &mut self.positions[index].1;
        let mut machine = StakingStateMachine::new(&mut self.pool, POOL_KEY, now);
        machine.claim(self.owner, &mut self.user, position, compound, None, mover)
    }

    pub fn position(&self, index: usize) -> &PositionRecord {
        &self.positions[index].1
    }

    pub fn position_key(&self, index: usize) -> Pubkey {
        self.positions[index].0
    }

    pub fn locked_count(&self) -> u64 {
        self.positions.iter().filter(|(_, p)| p.locked).count() as u64
    }
}

fn position_seed(option_ref: Pubkey, stake_index: u64) -> [u8; 32] {
    let mut bytes = option_ref.to_bytes();
    for (byte, index_byte) in bytes.iter_mut().zip(stake_index.to_le_bytes()) {
        *byte ^= index_byte.wrapping_add(1);
    }
    bytes
}
