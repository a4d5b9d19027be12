use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in `treesub`.
///
/// Only configuration and pool construction errors stop a run. Everything
/// that happens to a single file is reported against that file and the batch
/// carries on.
#[derive(Error, Debug)]
pub enum Error {
    /// An error related to file system I/O.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that occurred while parsing a YAML configuration file.
    #[error("Config parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An error while rendering the JSON summary.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A general configuration-related error.
    #[error("Config error: {0}")]
    Config(String),

    /// Writing the new content of a single file failed.
    #[error("File processing failed for {path}: {source}")]
    Processing {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error that occurred while building the Rayon thread pool.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A worker task panicked instead of returning a result.
    #[error("Task panicked: {0}")]
    Panicked(String),

    /// The search automaton for the old pattern could not be built.
    #[error("Pattern error: {0}")]
    Pattern(#[from] aho_corasick::BuildError),
}

/// A convenient type alias for `Result<T, treesub::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps any error that happened while writing `path`.
    pub fn processing<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Processing {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
