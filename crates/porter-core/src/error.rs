//! Error types for portal data operations.

use std::fmt;

use thiserror::Error;

use crate::key::TypeKey;

/// Boxed error used as the source of wrapped collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while importing, upgrading, exporting or deleting data.
#[derive(Error, Debug)]
pub enum PortalDataError {
    /// Missing or inconsistent configuration (orphan keys, unregistered handlers, bad globs).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The resolved key cannot be handled.
    #[error("Unsupported data {key} ({reason}): {origin}")]
    UnsupportedData {
        /// Key that was resolved for the document
        key: TypeKey,
        /// Description of the document
        origin: String,
        /// Why the data is unsupported
        reason: String,
    },

    /// Document could not be decoded.
    #[error("Failed to decode {origin}")]
    Decode {
        /// Description of the document
        origin: String,
        /// Underlying failure
        #[source]
        source: BoxError,
    },

    /// Data could not be encoded.
    #[error("Failed to encode {context}")]
    Encode {
        /// What was being encoded
        context: String,
        /// Underlying failure
        #[source]
        source: BoxError,
    },

    /// Upgrading a document failed.
    #[error("Failed to upgrade {origin}")]
    Upgrade {
        /// Description of the document
        origin: String,
        /// Underlying failure
        #[source]
        source: BoxError,
    },

    /// A registered handler reported a failure.
    #[error("Handler failed while {context}")]
    Handler {
        /// Operation that was running
        context: String,
        /// Underlying failure
        #[source]
        source: BoxError,
    },

    /// IO error while reading or writing data.
    #[error("IO error while {context}")]
    Io {
        /// Operation that was running
        context: String,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// One or more tasks of a batch failed.
    #[error(transparent)]
    Batch(#[from] BatchFailure),
}

/// Result type for portal data operations.
pub type Result<T> = std::result::Result<T, PortalDataError>;

impl PortalDataError {
    /// Build a decode error for a document.
    pub fn decode(origin: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            origin: origin.into(),
            source: source.into(),
        }
    }

    /// Build an encode error.
    pub fn encode(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Encode {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Build an upgrade error for a document.
    pub fn upgrade(origin: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Upgrade {
            origin: origin.into(),
            source: source.into(),
        }
    }

    /// Build a handler error.
    pub fn handler(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Handler {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Build an IO error.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build an unsupported data error.
    pub fn unsupported(key: TypeKey, origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedData {
            key,
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is an aggregate batch failure.
    pub fn is_batch_failure(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    /// Whether this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Aggregate failure of a batch, naming every task that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct BatchFailure {
    failed: Vec<String>,
}

impl BatchFailure {
    /// Create a batch failure from the descriptions of the failed tasks.
    pub fn new(failed: Vec<String>) -> Self {
        Self { failed }
    }

    /// Descriptions of the failed tasks, in the order they were observed.
    pub fn failed_tasks(&self) -> &[String] {
        &self.failed
    }

    /// Number of failed tasks.
    pub fn len(&self) -> usize {
        self.failed.len()
    }

    /// True when no task failed.
    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Halted due to {} failures, see previous errors for causes.",
            self.failed.len()
        )?;
        for description in &self.failed {
            writeln!(f, "\t{}", description)?;
        }
        Ok(())
    }
}
