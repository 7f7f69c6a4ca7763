//! Binary model loading
//!
//! The file is a flat run of 8-byte little-endian doubles:
//! `k, d_1..d_k, simplex height, delta, regularity, B, size_1..size_B`,
//! then for each block row and each symbol, `size^2` row-major entries.
//! Integer-valued fields are rounded to nearest on read.
//!
//! Any short read is fatal: the loader never hands back a partial model.

use super::{Model, ModelHeader, RegularityMode};
use crate::error::{ChainError, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Bytes per stored value
pub const VALUE_BYTES: u64 = 8;

/// Load a model file from disk
pub fn load(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ChainError::io(path, e))?;
    let len = file.metadata().map_err(|e| ChainError::io(path, e))?.len();

    log::debug!("opening model {} ({} bytes)", path.display(), len);
    let model = ModelLoader::new(BufReader::new(file), path)
        .with_len(len)
        .read_model()?;

    log::info!(
        "model loaded: {} symbols, {} block rows, largest block row {}",
        model.symbol_count(),
        model.block_row_count(),
        model.max_block_row_size()
    );
    Ok(model)
}

/// Incremental decoder over any byte source
pub struct ModelLoader<R> {
    reader: R,
    source: PathBuf,
    /// Total source length, when known up front
    len: Option<u64>,
    values_read: u64,
}

impl<R: Read> ModelLoader<R> {
    pub fn new(reader: R, source: impl Into<PathBuf>) -> Self {
        ModelLoader {
            reader,
            source: source.into(),
            len: None,
            values_read: 0,
        }
    }

    /// Declare the source length so oversized payloads fail before allocation
    pub fn with_len(mut self, len: u64) -> Self {
        self.len = Some(len);
        self
    }

    fn read_value(&mut self, field: &str) -> Result<f64> {
        match bincode::deserialize_from::<_, f64>(&mut self.reader) {
            Ok(v) => {
                self.values_read += 1;
                Ok(v)
            }
            Err(e) => Err(match *e {
                bincode::ErrorKind::Io(io) if io.kind() == ErrorKind::UnexpectedEof => {
                    ChainError::MalformedModel(format!(
                        "file truncated while reading {} (after {} values)",
                        field, self.values_read
                    ))
                }
                bincode::ErrorKind::Io(io) => ChainError::io(&self.source, io),
                other => ChainError::MalformedModel(format!("{}: {}", field, other)),
            }),
        }
    }

    fn read_integer(&mut self, field: &str) -> Result<i64> {
        let v = self.read_value(field)?;
        if !v.is_finite() {
            return Err(ChainError::MalformedModel(format!(
                "{} is not a finite number ({})",
                field, v
            )));
        }
        Ok(v.round() as i64)
    }

    /// A positive integer used to size later reads
    fn read_count(&mut self, field: &str) -> Result<usize> {
        let n = self.read_integer(field)?;
        if n < 1 {
            return Err(ChainError::MalformedModel(format!(
                "{} must be at least 1, found {}",
                field, n
            )));
        }
        usize::try_from(n)
            .map_err(|_| ChainError::MalformedModel(format!("{} too large: {}", field, n)))
    }

    /// Fail early if `count` more values cannot fit in what is left of the source
    fn ensure_available(&self, count: usize, field: &str) -> Result<()> {
        let Some(len) = self.len else {
            return Ok(());
        };
        let remaining = len.saturating_sub(self.values_read * VALUE_BYTES);
        let needed = (count as u64).saturating_mul(VALUE_BYTES);
        if needed > remaining {
            return Err(ChainError::MalformedModel(format!(
                "file truncated: {} needs {} bytes, only {} remain",
                field, needed, remaining
            )));
        }
        Ok(())
    }

    pub fn read_header(&mut self) -> Result<ModelHeader> {
        let symbol_count = self.read_count("symbol count")?;

        self.ensure_available(symbol_count, "shift values")?;
        let mut shift_values = alloc_values(symbol_count, "shift values")?;
        for _ in 0..symbol_count {
            shift_values.push(self.read_integer("shift values")?);
        }

        let simplex_height = self.read_integer("simplex height")?;
        let delta = self.read_value("delta")?;
        let regularity = RegularityMode::from_wire(self.read_integer("regularity mode")?);
        let block_row_count = self.read_count("block row count")?;

        self.ensure_available(block_row_count, "block row sizes")?;
        let mut block_row_sizes = alloc_values(block_row_count, "block row sizes")?;
        for _ in 0..block_row_count {
            block_row_sizes.push(self.read_count("block row size")?);
        }

        Ok(ModelHeader {
            symbol_count,
            shift_values,
            simplex_height,
            delta,
            regularity,
            block_row_sizes,
        })
    }

    pub fn read_model(mut self) -> Result<Model> {
        let header = self.read_header()?;
        log::debug!(
            "header: k={} simplex height={} delta={} {} block row sizes {:?}",
            header.symbol_count,
            header.simplex_height,
            header.delta,
            header.regularity,
            header.block_row_sizes
        );

        let total = header.total_payload_len().ok_or_else(|| {
            ChainError::MalformedModel("matrix payload size overflows".to_string())
        })?;
        self.ensure_available(total, "matrix payload")?;

        let mut payloads = Vec::with_capacity(header.block_row_count());
        for (block_row, &size) in header.block_row_sizes.iter().enumerate() {
            let per_symbol = size * size;
            let mut data = alloc_values(per_symbol * header.symbol_count, "matrix payload")?;
            for symbol in 0..header.symbol_count {
                for _ in 0..per_symbol {
                    let v = self.read_value("matrix payload")?;
                    if !v.is_finite() {
                        return Err(ChainError::MalformedModel(format!(
                            "non-finite entry {} in block row {}, symbol {}",
                            v, block_row, symbol
                        )));
                    }
                    data.push(v);
                }
            }
            payloads.push(data);
        }

        if let Some(len) = self.len {
            let trailing = len.saturating_sub(self.values_read * VALUE_BYTES);
            if trailing > 0 {
                log::debug!("ignoring {} trailing bytes after matrix payload", trailing);
            }
        }

        Model::from_parts(header, payloads)
    }
}

fn alloc_values<T>(count: usize, what: &'static str) -> Result<Vec<T>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(count)
        .map_err(|_| ChainError::OutOfMemory { what, count })?;
    Ok(values)
}
