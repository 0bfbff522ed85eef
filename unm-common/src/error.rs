//! Common error types for UNM

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for UNM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across UNM crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Failed to parse {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An engine needs a configuration key the caller did not provide
    #[error("{engine}: `{key}` should be configured for {purpose}")]
    MissingEngineConfig {
        engine: String,
        key: String,
        purpose: String,
    },
}
