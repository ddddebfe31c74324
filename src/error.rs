//! Custom error types and result handling for Tabane operations.
//!
//! This module defines the error handling system used throughout Tabane.
//! All fallible operations return a [`Result<T>`] which is a type alias for
//! `std::result::Result<T, Error>`.
//!
//! Only configuration problems and a failure to create the output directory are
//! fatal to a run. Everything else is scoped to a single job and surfaces through
//! the final [`Stats`](crate::stats::Stats).
use std::path::PathBuf;

/// Type alias for Results with Tabane errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Tabane operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// ZIP file operation errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// Directory traversal errors
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    /// Async task join errors
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error(transparent)]
    ConverterConfigBuilder(#[from] crate::converter::ConverterConfigBuilderError),
    /// No file of the source directory qualified for the archive
    #[error("No files found to archive in '{0:?}'")]
    NoContent(PathBuf),
    /// The archive already exists and will not be overwritten
    #[error("Output archive '{0:?}' already exists")]
    OutputExists(PathBuf),
    /// The shared output directory could not be created
    #[error("Failed to create output directory '{0:?}': {1}")]
    OutputDirectory(PathBuf, #[source] std::io::Error),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Invalid configuration values
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether this error means the job should be counted as skipped rather than failed.
    pub fn is_skip(&self) -> bool {
        matches!(self, Error::OutputExists(_))
    }
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
