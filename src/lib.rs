//! multalpha - log-norm of long symbol-indexed matrix chains
//!
//! For a symbol string `s1..sn` and a model with `B` block rows, evaluates
//! `ln Σ_i (1ᵀ · M_i[s1] · … · M_i[sn] · 1)` in one streaming pass, keeping
//! each block row's vector at unit norm and its scale in log space.

pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod run;
pub mod stream;

pub use chain::{ChainMultiplier, ChainOutcome};
pub use config::RunConfig;
pub use error::{ChainError, Result};
pub use model::Model;
pub use stream::{Symbol, SymbolReader};

/// Initialise `env_logger` on stderr; `RUST_LOG` overrides the default level
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
