pub mod initialize;
pub mod create_pool;
pub mod update_pool;
pub mod stake;
pub mod stake_batch;
pub mod unstake;
pub mod emergency_unstake;
pub mod restake;
pub mod claim;
pub mod preview_rewards;

#[allow(ambiguous_glob_reexports)]
pub use initialize::*;
#[allow(ambiguous_glob_reexports)]
pub use create_pool::*;
#[allow(ambiguous_glob_reexports)]
pub use update_pool::*;
#[allow(ambiguous_glob_reexports)]
pub use stake::*;
#[allow(ambiguous_glob_reexports)]
pub use stake_batch::*;
#[allow(ambiguous_glob_reexports)]
pub use unstake::*;
#[allow(ambiguous_glob_reexports)]
pub use emergency_unstake::*;
#[allow(ambiguous_glob_reexports)]
pub use restake::*;
#[allow(ambiguous_glob_reexports)]
pub use claim::*;
#[allow(ambiguous_glob_reexports)]
pub use preview_rewards::*;
