//! Error types for the image library and server startup.

use thiserror::Error;

/// Errors raised by the image library, templating and configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure reading or writing images or metadata.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The metadata file is not a valid JSON array of records.
    #[error("metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendering an HTML page failed.
    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    /// Configuration could not be loaded or deserialized.
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
