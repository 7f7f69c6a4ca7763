//! Finalization and log-sum-exp combination of block rows

use super::multiplier::BlockRowAccumulator;
use crate::error::{ChainError, DegenerateStage, Result};
use serde::Serialize;

/// `ln(Σ exp(x_i))` evaluated as `m + ln(Σ exp(x_i - m))`, `m = max x_i`.
///
/// Returns `-inf` for an empty slice.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlockRowResult {
    pub size: usize,
    /// Accumulated renormalization logs before the projection
    pub cumulative_log_norm: f64,
    /// Sum of the final unit vector
    pub projection: f64,
    /// `cumulative_log_norm + ln(projection)`
    pub final_log_norm: f64,
    /// Unit vector after the last symbol (all-ones if none were read)
    pub weights: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainOutcome {
    /// Combined result across block rows
    pub log_norm: f64,
    pub symbols_consumed: u64,
    pub block_rows: Vec<BlockRowResult>,
}

pub(crate) fn finalize(
    rows: Vec<BlockRowAccumulator>,
    symbols_consumed: u64,
) -> Result<ChainOutcome> {
    let mut block_rows = Vec::with_capacity(rows.len());
    for (block_row, acc) in rows.into_iter().enumerate() {
        let (weights, cumulative_log_norm) = acc.into_parts();
        let projection: f64 = weights.iter().sum();
        if !(projection > 0.0 && projection.is_finite()) {
            return Err(ChainError::DegenerateNorm {
                block_row,
                stage: DegenerateStage::Projection,
                value: projection,
            });
        }
        block_rows.push(BlockRowResult {
            size: weights.len(),
            cumulative_log_norm,
            projection,
            final_log_norm: cumulative_log_norm + projection.ln(),
            weights,
        });
    }

    let finals: Vec<f64> = block_rows.iter().map(|r| r.final_log_norm).collect();
    let log_norm = log_sum_exp(&finals);
    log::debug!("block row log norms {:?} -> {}", finals, log_norm);

    Ok(ChainOutcome {
        log_norm,
        symbols_consumed,
        block_rows,
    })
}
