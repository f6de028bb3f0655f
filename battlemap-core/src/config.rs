//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! [ingest]
//! chunk_size = 1000
//! bounds = "reject"   # or "warn"
//! max_reported_reasons = 5
//!
//! [filter]
//! map_id = 5
//! participant_names_any_of = ["Grute"]
//!
//! [filter.reward_range]
//! min_exp = 50
//!
//! [filter.source_date_range]
//! start = "2024-05-01T00:00:00"
//! ```

use crate::chunked::DEFAULT_CHUNK_SIZE;
use crate::error::{BattleMapError, Result};
use crate::filter::FilterSpec;
use crate::validation::{BoundsPolicy, ValidationOptions};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub bounds: BoundsPolicy,
    pub max_reported_reasons: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            bounds: BoundsPolicy::Reject,
            max_reported_reasons: 5,
        }
    }
}

impl IngestConfig {
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions::with_bounds(self.bounds)
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub ingest: IngestConfig,
    pub filter: FilterSpec,
}

impl PipelineConfig {
    /// Load pipeline configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BattleMapError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read pipeline config from {:?}: {}", path, e),
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse pipeline configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            BattleMapError::Parse(format!("Failed to parse pipeline config TOML: {}", e))
        })?;
        if config.ingest.chunk_size == 0 {
            return Err(BattleMapError::Config(
                "ingest.chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}
