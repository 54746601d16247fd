pub mod global_config;
pub mod option_lock;
pub mod pool_ledger;
pub mod position;
pub mod user_ledger;

pub use global_config::*;
pub use option_lock::*;
pub use pool_ledger::*;
pub use position::*;
pub use user_ledger::*;
