//! Model metadata read ahead of the matrix payload
//!
//! Only the alphabet size and the block-row sizes drive the multiplication.
//! The remaining fields are carried through so they can be reported.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of regularity constraint the matrices were generated with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegularityMode {
    PadOnly,
    PadAndSplice,
    SpliceOnly,
    #[default]
    Unknown,
}

impl RegularityMode {
    /// Decode the rounded wire value (0, 1, 2); anything else is `Unknown`
    pub fn from_wire(value: i64) -> Self {
        match value {
            0 => RegularityMode::PadOnly,
            1 => RegularityMode::PadAndSplice,
            2 => RegularityMode::SpliceOnly,
            _ => RegularityMode::Unknown,
        }
    }

    pub fn to_wire(self) -> f64 {
        match self {
            RegularityMode::PadOnly => 0.0,
            RegularityMode::PadAndSplice => 1.0,
            RegularityMode::SpliceOnly => 2.0,
            RegularityMode::Unknown => 3.0,
        }
    }
}

impl fmt::Display for RegularityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RegularityMode::PadOnly => "pad only",
            RegularityMode::PadAndSplice => "pad and splice",
            RegularityMode::SpliceOnly => "splice only",
            RegularityMode::Unknown => "regularity unknown",
        };
        f.write_str(label)
    }
}

/// Everything in the model file before the matrices
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelHeader {
    /// Alphabet size `k`
    pub symbol_count: usize,
    /// Shift amounts `d_1..d_k`
    pub shift_values: Vec<i64>,
    pub simplex_height: i64,
    /// Pad/splice penalty, kept unrounded
    pub delta: f64,
    pub regularity: RegularityMode,
    /// Square dimension of each block row's matrices
    pub block_row_sizes: Vec<usize>,
}

impl ModelHeader {
    pub fn block_row_count(&self) -> usize {
        self.block_row_sizes.len()
    }

    pub fn max_block_row_size(&self) -> usize {
        self.block_row_sizes.iter().copied().max().unwrap_or(0)
    }

    /// Number of matrix entries stored for one block row, `None` on overflow
    pub fn payload_len(&self, block_row: usize) -> Option<usize> {
        let size = *self.block_row_sizes.get(block_row)?;
        size.checked_mul(size)?.checked_mul(self.symbol_count)
    }

    /// Number of matrix entries across all block rows, `None` on overflow
    pub fn total_payload_len(&self) -> Option<usize> {
        (0..self.block_row_count()).try_fold(0usize, |acc, i| acc.checked_add(self.payload_len(i)?))
    }

    /// Number of doubles the header itself occupies on disk
    pub fn encoded_values(&self) -> usize {
        5 + self.symbol_count + self.block_row_count()
    }
}
