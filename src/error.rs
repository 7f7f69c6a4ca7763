//! Error type shared by the loader, the symbol reader and the multiplier

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where a degenerate value was hit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegenerateStage {
    /// Euclidean norm of `v·M` after a symbol was applied
    Renormalize { symbol_offset: u64 },
    /// Sum of the unit vector during finalization
    Projection,
}

impl fmt::Display for DegenerateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateStage::Renormalize { symbol_offset } => {
                write!(f, "norm after symbol {}", symbol_offset)
            }
            DegenerateStage::Projection => write!(f, "final projection"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("problem with input arguments: {0}")]
    Argument(String),

    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model: {0}")]
    MalformedModel(String),

    #[error("symbol out of range in input string at offset {offset} (byte 0x{byte:02x}); multiplication failed")]
    InvalidSymbol { byte: u8, offset: u64 },

    #[error("degenerate chain in block row {block_row}: {stage} is {value}")]
    DegenerateNorm {
        block_row: usize,
        stage: DegenerateStage,
        value: f64,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("out of memory allocating {count} values for {what}")]
    OutOfMemory { what: &'static str, count: usize },
}

pub type Result<T> = std::result::Result<T, ChainError>;

impl ChainError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChainError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(e: serde_json::Error) -> Self {
        ChainError::Config(e.to_string())
    }
}
