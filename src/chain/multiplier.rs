//! Streaming renormalized chain multiplication
//!
//! Each block row tracks `1ᵀ · M_{s1} · … · M_{sn}` as a unit row vector
//! plus the accumulated log of every renormalization factor. Symbols are
//! applied in arrival order; for each symbol every block row is updated
//! before the next symbol is looked at.

use super::combine::{self, ChainOutcome};
use crate::error::{ChainError, DegenerateStage, Result};
use crate::model::{MatrixView, Model};
use crate::stream::Symbol;

/// Running state of one block row
#[derive(Clone, Debug, PartialEq)]
pub struct BlockRowAccumulator {
    weights: Vec<f64>,
    log_norm: f64,
}

impl BlockRowAccumulator {
    /// All-ones start vector, not normalized
    pub fn new(size: usize) -> Result<Self> {
        let mut weights = Vec::new();
        weights
            .try_reserve_exact(size)
            .map_err(|_| ChainError::OutOfMemory {
                what: "weight vector",
                count: size,
            })?;
        weights.resize(size, 1.0);
        Ok(BlockRowAccumulator {
            weights,
            log_norm: 0.0,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of `ln(norm)` over every symbol applied so far
    pub fn log_norm(&self) -> f64 {
        self.log_norm
    }

    pub(crate) fn into_parts(self) -> (Vec<f64>, f64) {
        (self.weights, self.log_norm)
    }
}

pub struct ChainMultiplier<'m> {
    model: &'m Model,
    rows: Vec<BlockRowAccumulator>,
    /// `v·M` of every block row, back to back, before renormalization
    scratch: Vec<f64>,
    /// Per-row norms of the pending update
    norms: Vec<f64>,
    symbols_consumed: u64,
}

impl<'m> ChainMultiplier<'m> {
    pub fn new(model: &'m Model) -> Result<Self> {
        let rows = model
            .block_rows()
            .iter()
            .map(|row| BlockRowAccumulator::new(row.size()))
            .collect::<Result<Vec<_>>>()?;

        let total: usize = rows.iter().map(|acc| acc.weights.len()).sum();
        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(total)
            .map_err(|_| ChainError::OutOfMemory {
                what: "scratch vector",
                count: total,
            })?;
        scratch.resize(total, 0.0);
        let norms = vec![0.0; rows.len()];

        Ok(ChainMultiplier {
            model,
            rows,
            scratch,
            norms,
            symbols_consumed: 0,
        })
    }

    pub fn accumulators(&self) -> &[BlockRowAccumulator] {
        &self.rows
    }

    pub fn symbols_consumed(&self) -> u64 {
        self.symbols_consumed
    }

    /// Multiply every block row by the matrix for `symbol`, then renormalize.
    ///
    /// Either every block row advances or none does.
    pub fn apply(&mut self, symbol: Symbol) -> Result<()> {
        let model = self.model;
        let offset = self.symbols_consumed;
        if symbol.index() >= model.symbol_count() {
            return Err(ChainError::InvalidSymbol {
                byte: symbol.as_byte(),
                offset,
            });
        }

        let mut start = 0;
        for (block_row, acc) in self.rows.iter().enumerate() {
            let size = acc.weights.len();
            let out = &mut self.scratch[start..start + size];
            row_times_matrix(&acc.weights, model.matrix(block_row, symbol), out);

            let norm = euclidean_norm(out);
            if !(norm > 0.0 && norm.is_finite()) {
                return Err(ChainError::DegenerateNorm {
                    block_row,
                    stage: DegenerateStage::Renormalize {
                        symbol_offset: offset,
                    },
                    value: norm,
                });
            }
            self.norms[block_row] = norm;
            start += size;
        }

        let mut start = 0;
        for (acc, &norm) in self.rows.iter_mut().zip(&self.norms) {
            let size = acc.weights.len();
            for (w, &x) in acc.weights.iter_mut().zip(&self.scratch[start..start + size]) {
                *w = x / norm;
            }
            acc.log_norm += norm.ln();
            start += size;
        }

        self.symbols_consumed += 1;
        Ok(())
    }

    /// Apply symbols until the stream ends, stopping at the first error.
    ///
    /// State for symbols applied before the error is kept.
    pub fn consume<I>(&mut self, symbols: I) -> Result<u64>
    where
        I: IntoIterator<Item = Result<Symbol>>,
    {
        let start = self.symbols_consumed;
        for symbol in symbols {
            self.apply(symbol?)?;
        }
        Ok(self.symbols_consumed - start)
    }

    /// Fold in the all-ones projection and combine block rows
    pub fn finalize(self) -> Result<ChainOutcome> {
        log::debug!(
            "finalizing {} block rows after {} symbols",
            self.rows.len(),
            self.symbols_consumed
        );
        combine::finalize(self.rows, self.symbols_consumed)
    }
}

/// `out[c] = Σ_r v[r] · m[r][c]`, summed over ascending `r`
fn row_times_matrix(v: &[f64], m: MatrixView<'_>, out: &mut [f64]) {
    out.fill(0.0);
    for (&vr, row) in v.iter().zip(m.rows()) {
        for (o, &x) in out.iter_mut().zip(row) {
            *o += vr * x;
        }
    }
}

/// `‖v‖₂`, scaled by the largest magnitude so squaring cannot over- or underflow
fn euclidean_norm(v: &[f64]) -> f64 {
    let max = v.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    if max == 0.0 || !max.is_finite() {
        return max;
    }
    let sum: f64 = v.iter().map(|x| (x / max) * (x / max)).sum();
    max * sum.sqrt()
}
