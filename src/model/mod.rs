//! Model: immutable matrix set indexed by (block row, symbol)
//!
//! # Components
//! - `header.rs`: metadata preceding the matrices
//! - `loader.rs`: decoding the binary model file
//! - `writer.rs`: encoding a model back into the same layout
//! - `description.rs`: JSON description used to author models by hand

pub mod description;
pub mod header;
pub mod loader;
pub mod writer;

pub use description::ModelDescription;
pub use header::{ModelHeader, RegularityMode};
pub use loader::{load, ModelLoader};

use crate::error::{ChainError, Result};
use crate::stream::Symbol;

/// All matrices of one block row, stored symbol after symbol
#[derive(Clone, Debug, PartialEq)]
pub struct BlockRow {
    size: usize,
    data: Vec<f64>,
}

impl BlockRow {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn symbol_count(&self) -> usize {
        self.data.len() / (self.size * self.size)
    }

    pub fn matrix(&self, symbol: usize) -> MatrixView<'_> {
        let len = self.size * self.size;
        let start = symbol * len;
        MatrixView {
            data: &self.data[start..start + len],
            dim: self.size,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }
}

/// Read-only square row-major matrix
#[derive(Clone, Copy, Debug)]
pub struct MatrixView<'a> {
    data: &'a [f64],
    dim: usize,
}

impl<'a> MatrixView<'a> {
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.dim + col]
    }

    pub fn row(&self, row: usize) -> &'a [f64] {
        &self.data[row * self.dim..(row + 1) * self.dim]
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'a, f64> {
        self.data.chunks_exact(self.dim)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    header: ModelHeader,
    block_rows: Vec<BlockRow>,
    max_block_row_size: usize,
}

impl Model {
    /// Assemble a model from its header and one flat payload per block row.
    ///
    /// Each payload must hold exactly `symbol_count * size^2` values.
    pub fn from_parts(header: ModelHeader, payloads: Vec<Vec<f64>>) -> Result<Self> {
        if header.symbol_count == 0 {
            return Err(ChainError::MalformedModel(
                "model must have at least one symbol".to_string(),
            ));
        }
        if header.shift_values.len() != header.symbol_count {
            return Err(ChainError::MalformedModel(format!(
                "expected {} shift values, found {}",
                header.symbol_count,
                header.shift_values.len()
            )));
        }
        if header.block_row_sizes.is_empty() {
            return Err(ChainError::MalformedModel(
                "model must have at least one block row".to_string(),
            ));
        }
        if payloads.len() != header.block_row_count() {
            return Err(ChainError::MalformedModel(format!(
                "expected {} block rows, found {}",
                header.block_row_count(),
                payloads.len()
            )));
        }

        let mut block_rows = Vec::with_capacity(payloads.len());
        for (i, data) in payloads.into_iter().enumerate() {
            let size = header.block_row_sizes[i];
            if size == 0 {
                return Err(ChainError::MalformedModel(format!(
                    "block row {} has size 0",
                    i
                )));
            }
            let expected = header.payload_len(i).ok_or_else(|| {
                ChainError::MalformedModel(format!("block row {} payload overflows", i))
            })?;
            if data.len() != expected {
                return Err(ChainError::MalformedModel(format!(
                    "block row {} holds {} values, expected {}",
                    i,
                    data.len(),
                    expected
                )));
            }
            block_rows.push(BlockRow { size, data });
        }

        let max_block_row_size = header.max_block_row_size();
        Ok(Model {
            header,
            block_rows,
            max_block_row_size,
        })
    }

    pub fn header(&self) -> &ModelHeader {
        &self.header
    }

    pub fn symbol_count(&self) -> usize {
        self.header.symbol_count
    }

    pub fn block_row_count(&self) -> usize {
        self.block_rows.len()
    }

    pub fn block_rows(&self) -> &[BlockRow] {
        &self.block_rows
    }

    /// Largest block-row dimension
    pub fn max_block_row_size(&self) -> usize {
        self.max_block_row_size
    }

    pub fn matrix(&self, block_row: usize, symbol: Symbol) -> MatrixView<'_> {
        self.block_rows[block_row].matrix(symbol.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(k: usize, sizes: Vec<usize>) -> ModelHeader {
        ModelHeader {
            symbol_count: k,
            shift_values: vec![0; k],
            simplex_height: 1,
            delta: 0.0,
            regularity: RegularityMode::PadOnly,
            block_row_sizes: sizes,
        }
    }

    #[test]
    fn test_matrix_view_indexing() {
        // two symbols, 2x2: first matrix 1..4, second 5..8
        let payload: Vec<f64> = (1..=8).map(f64::from).collect();
        let model = Model::from_parts(header(2, vec![2]), vec![payload]).unwrap();

        let m0 = model.matrix(0, Symbol::new(0));
        assert_eq!(m0.dim(), 2);
        assert_eq!(m0.get(0, 1), 2.0);
        assert_eq!(m0.get(1, 0), 3.0);

        let m1 = model.matrix(0, Symbol::new(1));
        assert_eq!(m1.row(1), &[7.0, 8.0]);
        assert_eq!(m1.rows().count(), 2);
        assert_eq!(model.block_rows()[0].symbol_count(), 2);
    }

    #[test]
    fn test_max_block_row_size() {
        let model = Model::from_parts(
            header(1, vec![1, 3, 2]),
            vec![vec![1.0], vec![0.0; 9], vec![0.0; 4]],
        )
        .unwrap();
        assert_eq!(model.max_block_row_size(), 3);
        assert_eq!(model.block_row_count(), 3);
    }

    #[test]
    fn test_from_parts_rejects_wrong_payload() {
        let err = Model::from_parts(header(2, vec![2]), vec![vec![0.0; 7]]).unwrap_err();
        assert!(matches!(err, ChainError::MalformedModel(_)));

        let err = Model::from_parts(header(1, vec![2, 2]), vec![vec![0.0; 4]]).unwrap_err();
        assert!(matches!(err, ChainError::MalformedModel(_)));
    }

    #[test]
    fn test_from_parts_rejects_empty_shapes() {
        assert!(Model::from_parts(header(0, vec![1]), vec![vec![]]).is_err());
        assert!(Model::from_parts(header(1, vec![]), vec![]).is_err());
        assert!(Model::from_parts(header(1, vec![0]), vec![vec![]]).is_err());
    }
}
