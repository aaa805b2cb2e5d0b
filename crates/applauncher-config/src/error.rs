//! Errors raised while reading application documents.

use std::path::PathBuf;

use thiserror::Error;

/// Errors arising from a single configuration directory or document.
///
/// The loader logs these and carries on, so one unreadable document never
/// hides the others.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured directory does not exist or is not a directory.
    #[error("configuration directory '{path}' cannot be found")]
    MissingDirectory {
        /// Directory that was checked.
        path: PathBuf,
    },

    /// A directory or document could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration directory could not be listed.
    #[error("failed to list '{path}': {source}")]
    Walk {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying traversal error.
        #[source]
        source: walkdir::Error,
    },

    /// A document is not valid JSON or does not match the schema.
    #[error("'{path}' could not be loaded: {source}")]
    Parse {
        /// Document path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
