//! JSON model description
//!
//! ```json
//! {
//!   "symbol_count": 2,
//!   "shift_values": [0, 1],
//!   "simplex_height": 2,
//!   "delta": 0.1,
//!   "regularity": "pad_and_splice",
//!   "block_rows": [[ [[1.0, 0.0], [0.0, 1.0]], [[2.0, 1.0], [0.0, 1.0]] ]]
//! }
//! ```
//!
//! `block_rows[i][s]` is the matrix for block row `i` and symbol `s`, as a
//! list of rows. Missing shift values default to zeros.

use super::{Model, ModelHeader, RegularityMode};
use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub type DenseMatrix = Vec<Vec<f64>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDescription {
    pub symbol_count: usize,
    #[serde(default)]
    pub shift_values: Vec<i64>,
    #[serde(default)]
    pub simplex_height: i64,
    #[serde(default)]
    pub delta: f64,
    #[serde(default)]
    pub regularity: RegularityMode,
    pub block_rows: Vec<Vec<DenseMatrix>>,
}

impl ModelDescription {
    /// Description with default metadata
    pub fn new(symbol_count: usize, block_rows: Vec<Vec<DenseMatrix>>) -> Self {
        ModelDescription {
            symbol_count,
            shift_values: Vec::new(),
            simplex_height: 0,
            delta: 0.0,
            regularity: RegularityMode::default(),
            block_rows,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ChainError::MalformedModel(format!("invalid model description: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ChainError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Check shapes and flatten into a `Model`
    pub fn into_model(self) -> Result<Model> {
        let k = self.symbol_count;
        let shift_values = if self.shift_values.is_empty() {
            vec![0; k]
        } else {
            self.shift_values
        };

        let mut block_row_sizes = Vec::with_capacity(self.block_rows.len());
        let mut payloads = Vec::with_capacity(self.block_rows.len());

        for (i, matrices) in self.block_rows.into_iter().enumerate() {
            if matrices.len() != k {
                return Err(ChainError::MalformedModel(format!(
                    "block row {} has {} matrices, expected one per symbol ({})",
                    i,
                    matrices.len(),
                    k
                )));
            }
            let size = matrices.first().map(|m| m.len()).unwrap_or(0);
            let mut data = Vec::with_capacity(k * size * size);
            for (s, matrix) in matrices.into_iter().enumerate() {
                if matrix.len() != size || matrix.iter().any(|row| row.len() != size) {
                    return Err(ChainError::MalformedModel(format!(
                        "matrix for block row {}, symbol {} is not {}x{}",
                        i, s, size, size
                    )));
                }
                data.extend(matrix.into_iter().flatten());
            }
            block_row_sizes.push(size);
            payloads.push(data);
        }

        let header = ModelHeader {
            symbol_count: k,
            shift_values,
            simplex_height: self.simplex_height,
            delta: self.delta,
            regularity: self.regularity,
            block_row_sizes,
        };
        Model::from_parts(header, payloads)
    }
}
