use thiserror::Error;
use virtuoso_triple_store::error::TripleStoreError;

use crate::config::ConfigError;

/// Top-level application error that composes all subsystem errors
#[derive(Error, Debug)]
pub(crate) enum AppError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Triple store errors
    #[error("Triple store error: {0}")]
    TripleStore(#[from] TripleStoreError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Command-line arguments that clap accepted but cannot be used together
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}
