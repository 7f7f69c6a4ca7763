//! Batched symbol reader
//!
//! Lines are concatenated verbatim (only the `\n` terminator is dropped), a
//! few at a time, and handed out one byte at a time as symbols. A batch also
//! stops at `max_batch_bytes`, so a long line is split across batches. Neither
//! limit changes the symbol sequence.

use super::Symbol;
use crate::error::{ChainError, Result};
use std::io::{BufRead, ErrorKind};
use std::path::PathBuf;

pub const DEFAULT_LINES_PER_BATCH: usize = 3;
pub const DEFAULT_MAX_BATCH_BYTES: usize = 64 * 1024;

pub struct SymbolReader<R> {
    source: R,
    source_name: PathBuf,
    alphabet_size: usize,
    lines_per_batch: usize,
    max_batch_bytes: usize,
    batch: Vec<u8>,
    cursor: usize,
    /// Symbols handed out so far, including the failing one
    offset: u64,
    batches_read: u64,
    exhausted: bool,
    failed: bool,
}

impl<R: BufRead> SymbolReader<R> {
    pub fn new(source: R, alphabet_size: usize, lines_per_batch: usize) -> Self {
        SymbolReader {
            source,
            source_name: PathBuf::from("<symbols>"),
            alphabet_size,
            lines_per_batch: lines_per_batch.max(1),
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            batch: Vec::new(),
            cursor: 0,
            offset: 0,
            batches_read: 0,
            exhausted: false,
            failed: false,
        }
    }

    /// Name used in I/O diagnostics
    pub fn with_source_name(mut self, name: impl Into<PathBuf>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn with_max_batch_bytes(mut self, max_batch_bytes: usize) -> Self {
        self.max_batch_bytes = max_batch_bytes.max(1);
        self
    }

    /// True until the source has reported end of input
    pub fn has_more_batches(&self) -> bool {
        !self.exhausted && !self.failed
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn batches_read(&self) -> u64 {
        self.batches_read
    }

    fn fill_batch(&mut self) -> Result<()> {
        self.batch.clear();
        self.cursor = 0;

        let mut lines = 0;
        while lines < self.lines_per_batch && self.batch.len() < self.max_batch_bytes {
            let room = self.max_batch_bytes - self.batch.len();
            let chunk = match self.source.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ChainError::io(&self.source_name, e)),
            };
            if chunk.is_empty() {
                self.exhausted = true;
                break;
            }

            // (bytes kept, bytes consumed, line finished)
            let (take, used, line_done) = match chunk.iter().position(|&b| b == b'\n') {
                Some(end) if end <= room => (end, end + 1, true),
                _ => {
                    let n = chunk.len().min(room);
                    (n, n, false)
                }
            };
            self.batch.extend_from_slice(&chunk[..take]);
            self.source.consume(used);
            if line_done {
                lines += 1;
            }
        }

        self.batches_read += 1;
        log::trace!(
            "batch {}: {} lines, {} symbols",
            self.batches_read,
            lines,
            self.batch.len()
        );
        Ok(())
    }

    /// Next symbol, `None` once the source is exhausted or after an error
    pub fn next_symbol(&mut self) -> Option<Result<Symbol>> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(&byte) = self.batch.get(self.cursor) {
                self.cursor += 1;
                let offset = self.offset;
                self.offset += 1;
                return Some(match Symbol::from_byte(byte, self.alphabet_size) {
                    Some(symbol) => Ok(symbol),
                    None => {
                        self.failed = true;
                        Err(ChainError::InvalidSymbol { byte, offset })
                    }
                });
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fill_batch() {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

impl<R: BufRead> Iterator for SymbolReader<R> {
    type Item = Result<Symbol>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_symbol()
    }
}
