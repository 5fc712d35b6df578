//! Error types for directory scanning.

use std::path::PathBuf;

use porter_core::PortalDataError;
use thiserror::Error;

/// Errors that can occur while scanning a directory for data files.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Scan root is missing or not a directory.
    #[error("Scan root is not a directory: {0}")]
    RootNotFound(PathBuf),

    /// Include or exclude glob does not compile.
    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as written
        pattern: String,
        /// Compilation failure
        #[source]
        source: globset::Error,
    },

    /// Directory traversal failed.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// A matched file is not an XML document.
    #[error("Not a data file: {}", path.display())]
    NotData {
        /// Offending file
        path: PathBuf,
        /// Why its root element could not be read
        #[source]
        source: PortalDataError,
    },

    /// Reading a matched file failed.
    #[error(transparent)]
    Read(PortalDataError),

    /// Blocking walk task failed to complete.
    #[error("Scan task failed: {0}")]
    Task(String),
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

impl From<ScanError> for PortalDataError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::RootNotFound(_) | ScanError::InvalidPattern { .. } => {
                PortalDataError::Configuration(err.to_string())
            }
            ScanError::Walk(e) => PortalDataError::io("scanning directory", e.into()),
            ScanError::NotData { source, .. } | ScanError::Read(source) => source,
            ScanError::Task(msg) => PortalDataError::handler("scanning directory", msg),
        }
    }
}
