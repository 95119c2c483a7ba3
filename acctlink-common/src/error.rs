//! Common error types for acctlink

use std::path::PathBuf;

use thiserror::Error;

/// Common result type for acctlink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across acctlink crates
///
/// Linking and metrics never produce these; they are raised by configuration
/// loading and by the loaders at the file boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record file could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reading or decoding one source file
    #[error("{}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the offending file to an I/O or decode error
    pub fn at_path(path: impl Into<PathBuf>, source: impl Into<Error>) -> Self {
        Error::Source {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }

    /// Innermost error, looking through file context
    pub fn root(&self) -> &Error {
        match self {
            Error::Source { source, .. } => source.root(),
            other => other,
        }
    }
}
