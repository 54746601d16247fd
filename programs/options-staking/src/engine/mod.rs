pub mod machine;
pub mod mover;
pub mod reward;

#[cfg(test)]
pub(crate) mod test_utils;

pub use machine::*;
pub use mover::*;
