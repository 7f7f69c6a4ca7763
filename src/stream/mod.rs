//! Symbol stream: text input turned into alphabet indices
//!
//! # Components
//! - `reader.rs`: batched line reader yielding one symbol per byte

pub mod reader;

pub use reader::{SymbolReader, DEFAULT_LINES_PER_BATCH, DEFAULT_MAX_BATCH_BYTES};

use serde::Serialize;

/// Zero-based alphabet index; the character `'1'` is symbol 0
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Symbol(usize);

impl Symbol {
    pub fn new(index: usize) -> Self {
        Symbol(index)
    }

    /// Map `byte - '1'` into `[0, alphabet_size)`
    pub fn from_byte(byte: u8, alphabet_size: usize) -> Option<Self> {
        let index = (byte as usize).checked_sub(b'1' as usize)?;
        (index < alphabet_size).then_some(Symbol(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Input byte this symbol is written as (wraps for indices past 254)
    pub fn as_byte(self) -> u8 {
        b'1'.wrapping_add(self.0 as u8)
    }
}
