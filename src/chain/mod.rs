//! Chain evaluation: per-symbol updates and final combination
//!
//! # Components
//! - `multiplier.rs`: renormalized vector-matrix updates per block row
//! - `combine.rs`: all-ones projection and log-sum-exp across block rows

pub mod combine;
pub mod multiplier;

pub use combine::{log_sum_exp, BlockRowResult, ChainOutcome};
pub use multiplier::{BlockRowAccumulator, ChainMultiplier};
