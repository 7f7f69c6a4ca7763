//! Run configuration
//!
//! Throughput knobs only; none of them change the computed value.
//! Loaded from an optional JSON file, then overridden by CLI flags.

use crate::error::{ChainError, Result};
use crate::stream::{DEFAULT_LINES_PER_BATCH, DEFAULT_MAX_BATCH_BYTES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Lines concatenated per read batch
    pub lines_per_batch: usize,
    /// Capacity of the buffered reader over the symbol source, also the
    /// largest batch the symbol reader holds at once
    pub read_buffer_bytes: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            lines_per_batch: DEFAULT_LINES_PER_BATCH,
            read_buffer_bytes: DEFAULT_MAX_BATCH_BYTES,
        }
    }
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ChainError::io(path, e))?;
        Self::from_json(&content)
    }

    pub fn with_lines_per_batch(mut self, lines_per_batch: usize) -> Self {
        self.lines_per_batch = lines_per_batch;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.lines_per_batch == 0 {
            return Err(ChainError::Config(
                "lines_per_batch must be at least 1".to_string(),
            ));
        }
        if self.read_buffer_bytes == 0 {
            return Err(ChainError::Config(
                "read_buffer_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
