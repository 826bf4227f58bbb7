use std::path::PathBuf;

/// Errors that can occur while saving or loading agent files.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to access agent file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt agent file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode agent state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors surfaced by the rules engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("column {0} is out of range (expected 0..=6)")]
    InvalidColumn(usize),

    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("game should be terminal but has no outcome")]
    MissingOutcome,

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
