//! Core library for battle telemetry ingestion and filtering.

pub mod chunked;
pub mod config;
pub mod error;
pub mod facets;
pub mod file_utils;
pub mod filter;
pub mod models;
pub mod report;
pub mod validation;

pub use chunked::{ChunkProgress, ChunkedValidator, DEFAULT_CHUNK_SIZE, validate_items_chunked};
pub use error::{BattleMapError, Result};
pub use filter::{FilterCounts, FilterSpec, apply, counts};
pub use models::BattleRecord;
pub use report::{BatchReport, IngestSummary};
pub use validation::{
    BoundsPolicy, RecordError, ValidationOptions, parse_batch, validate_batch, validate_items,
};
