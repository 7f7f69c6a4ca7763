//! Encoding a model into the binary layout the loader reads

use super::Model;
use crate::error::{ChainError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct ModelWriter<W: Write> {
    writer: W,
}

impl<W: Write> ModelWriter<W> {
    pub fn new(writer: W) -> Self {
        ModelWriter { writer }
    }

    fn write_value(&mut self, value: f64) -> std::result::Result<(), bincode::Error> {
        bincode::serialize_into(&mut self.writer, &value)
    }

    fn write_all(&mut self, model: &Model) -> std::result::Result<(), bincode::Error> {
        let header = model.header();
        self.write_value(header.symbol_count as f64)?;
        for &d in &header.shift_values {
            self.write_value(d as f64)?;
        }
        self.write_value(header.simplex_height as f64)?;
        self.write_value(header.delta)?;
        self.write_value(header.regularity.to_wire())?;
        self.write_value(header.block_row_count() as f64)?;
        for &size in &header.block_row_sizes {
            self.write_value(size as f64)?;
        }
        for row in model.block_rows() {
            for &v in row.values() {
                self.write_value(v)?;
            }
        }
        Ok(())
    }

    /// Write the whole model and hand back the underlying writer
    pub fn write_model(mut self, model: &Model, target: &Path) -> Result<W> {
        let to_error = |e: bincode::Error| match *e {
            bincode::ErrorKind::Io(io) => ChainError::io(target, io),
            other => ChainError::MalformedModel(other.to_string()),
        };
        self.write_all(model).map_err(to_error)?;
        self.writer.flush().map_err(|e| ChainError::io(target, e))?;
        Ok(self.writer)
    }
}

/// Encode into memory
pub fn encode_model(model: &Model) -> Result<Vec<u8>> {
    ModelWriter::new(Vec::new()).write_model(model, Path::new("<memory>"))
}

/// Encode into a file, replacing it if present
pub fn write_model_file(path: impl AsRef<Path>, model: &Model) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| ChainError::io(path, e))?;
    ModelWriter::new(BufWriter::new(file)).write_model(model, path)?;
    log::info!("wrote model to {}", path.display());
    Ok(())
}
