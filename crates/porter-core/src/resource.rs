//! Importable resources: files on disk or in-memory documents.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::document::{peek_root_element, RootElement, XmlDocument};
use crate::error::{PortalDataError, Result};

/// A source of one XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// Document stored in a file
    File(PathBuf),
    /// Document held in memory, e.g. produced by a caller or an upgrade
    Memory {
        /// Human-readable name used in logs and errors
        description: String,
        /// Raw document bytes
        content: Arc<[u8]>,
    },
}

impl Resource {
    /// Resource for a file path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Resource for bytes held in memory.
    pub fn memory(description: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::Memory {
            description: description.into(),
            content: Arc::from(content.into()),
        }
    }

    /// Resource for a location string, accepting `file:` and `file://` prefixes.
    pub fn from_location(location: &str) -> Self {
        let path = location
            .strip_prefix("file://")
            .or_else(|| location.strip_prefix("file:"))
            .unwrap_or(location);
        Self::File(PathBuf::from(path))
    }

    /// Description used in logs, errors and batch failure reports.
    pub fn description(&self) -> String {
        match self {
            Self::File(path) => format!("file [{}]", path.display()),
            Self::Memory { description, .. } => description.clone(),
        }
    }

    /// Path of a file resource.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Memory { .. } => None,
        }
    }

    /// Read the raw bytes of the resource.
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| PortalDataError::io(format!("reading {}", self.description()), e)),
            Self::Memory { content, .. } => Ok(content.to_vec()),
        }
    }

    /// Read and fully decode the resource.
    pub async fn load(&self) -> Result<XmlDocument> {
        let bytes = self.read_bytes().await?;
        let document = XmlDocument::parse(&bytes, self.description())?;
        debug!(
            origin = document.origin(),
            bytes = bytes.len(),
            events = document.len(),
            "Loaded document"
        );
        Ok(document)
    }

    /// Describe the root element without decoding the rest of the document.
    pub async fn peek_root(&self) -> Result<RootElement> {
        let bytes = self.read_bytes().await?;
        peek_root_element(&bytes, &self.description())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}
