use anchor_lang::prelude::*;

#[error_code]
pub enum StakingError {
    #[msg("Option is already locked in an active position")]
    AlreadyStaked,

    #[msg("Lock period is negative, too long, or overflows the clock")]
    InvalidLockPeriod,

    #[msg("Position is not locked")]
    NotLocked,

    #[msg("Lock period has not expired")]
    LockNotExpired,

    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("No rewards to claim")]
    NothingToClaim,

    #[msg("Reward transfer failed")]
    TransferFailed,

    #[msg("Position changed since it was read")]
    ConcurrentModification,

    #[msg("Pool is paused")]
    PoolPaused,

    #[msg("Pool must be paused for emergency unstake")]
    PoolNotPaused,

    #[msg("User ledger has no room for another position")]
    TooManyPositions,

    #[msg("Position does not belong to this ledger")]
    PositionMismatch,

    #[msg("Penalty ratio exceeds 100%")]
    InvalidPenaltyRatio,

    #[msg("Option type weight out of range")]
    InvalidTypeWeight,

    #[msg("Reward mint or reserve is not controlled by the pool authority")]
    InvalidRewardAccount,

    #[msg("Reward reserve account is required for this pool")]
    MissingRewardReserve,

    #[msg("Arithmetic overflow")]
    Overflow,

    #[msg("Crowded reward rate must not exceed the base rate")]
    InvalidRewardRate,

    #[msg("Batch is empty, too large, or does not match the supplied accounts")]
    InvalidBatch,
}

impl StakingError {
    /// Only these leave state untouched in a way a resubmission can fix.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StakingError::TransferFailed | StakingError::ConcurrentModification
        )
    }
}
