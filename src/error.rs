//! Error types for cadence operations.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CadenceError {
    #[error("Configuration write failed: {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration could not be serialized: {0}")]
    ConfigSerialize(#[from] serde_json::Error),

    #[error("Log directory unavailable: {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CadenceError>;
