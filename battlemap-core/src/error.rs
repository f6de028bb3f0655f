use thiserror::Error;

#[derive(Error, Debug)]
pub enum BattleMapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Top-level payload is neither a record object nor a list of them.
    /// Fatal for the whole call, unlike per-record validation failures.
    #[error("Invalid batch structure: {0}")]
    BatchStructure(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BattleMapError>;
