//! One evaluation: model + symbol source -> outcome

use crate::chain::{ChainMultiplier, ChainOutcome};
use crate::config::RunConfig;
use crate::error::{ChainError, Result};
use crate::model::{Model, ModelHeader};
use crate::stream::SymbolReader;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where symbols are read from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolSource {
    Path(PathBuf),
    Stdin,
}

impl SymbolSource {
    /// `-` means standard input
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            SymbolSource::Stdin
        } else {
            SymbolSource::Path(PathBuf::from(arg))
        }
    }

    pub fn name(&self) -> PathBuf {
        match self {
            SymbolSource::Path(p) => p.clone(),
            SymbolSource::Stdin => PathBuf::from("<stdin>"),
        }
    }
}

/// Stream every symbol of `source` through `model`
pub fn evaluate<R: BufRead>(
    model: &Model,
    source: R,
    source_name: impl Into<PathBuf>,
    config: &RunConfig,
) -> Result<ChainOutcome> {
    let mut multiplier = ChainMultiplier::new(model)?;
    let mut reader = SymbolReader::new(source, model.symbol_count(), config.lines_per_batch)
        .with_max_batch_bytes(config.read_buffer_bytes)
        .with_source_name(source_name);

    if let Err(e) = multiplier.consume(&mut reader) {
        log::warn!(
            "evaluation stopped after {} symbols ({} batches read)",
            multiplier.symbols_consumed(),
            reader.batches_read()
        );
        return Err(e);
    }
    log::debug!(
        "stream exhausted: {} symbols in {} batches",
        multiplier.symbols_consumed(),
        reader.batches_read()
    );
    multiplier.finalize()
}

pub fn evaluate_source(
    model: &Model,
    source: &SymbolSource,
    config: &RunConfig,
) -> Result<ChainOutcome> {
    match source {
        SymbolSource::Path(path) => {
            let file = File::open(path).map_err(|e| ChainError::io(path, e))?;
            let reader = BufReader::with_capacity(config.read_buffer_bytes, file);
            evaluate(model, reader, path, config)
        }
        SymbolSource::Stdin => {
            let stdin = io::stdin();
            let reader = BufReader::with_capacity(config.read_buffer_bytes, stdin.lock());
            evaluate(model, reader, source.name(), config)
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    model: &'a ModelHeader,
    outcome: &'a ChainOutcome,
}

/// Write the model metadata and per-block-row results as JSON
pub fn write_report(path: &Path, header: &ModelHeader, outcome: &ChainOutcome) -> Result<()> {
    let file = File::create(path).map_err(|e| ChainError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &Report { model: header, outcome })
        .map_err(|e| ChainError::io(path, io::Error::from(e)))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| ChainError::io(path, e))?;
    log::info!("report written to {}", path.display());
    Ok(())
}
