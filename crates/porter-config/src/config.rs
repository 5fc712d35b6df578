//! Configuration types for batch import and export.

use std::time::Duration;

use globset::Glob;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Include pattern used when a batch import names none.
pub const DEFAULT_INCLUDE: &str = "**/*.xml";

/// Files never imported: editor backups, OS metadata and VCS bookkeeping.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    "**/CVS",
    "**/CVS/**",
    "**/.cvsignore",
    "**/SCCS",
    "**/SCCS/**",
    "**/vssver.scc",
    "**/.svn",
    "**/.svn/**",
    "**/.DS_Store",
    "**/.git",
    "**/.git/**",
    "**/.gitattributes",
    "**/.gitignore",
    "**/.gitmodules",
    "**/.hg",
    "**/.hg/**",
    "**/.hgignore",
    "**/.hgsub",
    "**/.hgsubstate",
    "**/.hgtags",
    "**/.bzr",
    "**/.bzr/**",
    "**/.bzrignore",
];

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that was being read
        path: String,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither `.toml` nor `.json`
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// A glob pattern does not compile
    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as written
        pattern: String,
        /// Compilation failure
        #[source]
        source: globset::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortalDataConfig {
    /// Batch import settings
    pub import: ImportConfig,

    /// Worker pool settings
    pub workers: WorkerConfig,
}

impl PortalDataConfig {
    /// Check value ranges and compile every glob once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.import.validate()?;
        self.workers.validate()
    }
}

/// Batch import settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImportConfig {
    /// Globs selecting files to import when a batch names no pattern
    pub includes: Vec<String>,

    /// Globs always excluded, even when a batch names its own pattern
    pub excludes: Vec<String>,

    /// Halt and report on the first failed file
    pub fail_on_error: bool,

    /// Skip files that are not XML instead of failing the scan
    pub ignore_non_data_files: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            includes: vec![DEFAULT_INCLUDE.to_string()],
            excludes: DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect(),
            fail_on_error: true,
            ignore_non_data_files: false,
        }
    }
}

impl ImportConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.includes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "import.includes".to_string(),
                reason: "at least one include pattern is required".to_string(),
            });
        }
        for pattern in self.includes.iter().chain(&self.excludes) {
            Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of tasks allowed to run at once
    pub pool_size: usize,

    /// Upper bound, in milliseconds, on waiting for any single task while draining
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_wait_ms: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: num_cpus::get(),
            max_wait_ms: None,
        }
    }
}

impl WorkerConfig {
    /// Per-task wait bound as a duration.
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_ms.map(Duration::from_millis)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workers.pool_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_wait_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "workers.max_wait_ms".to_string(),
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }
}
