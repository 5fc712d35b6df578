//! Directory scanning: find candidate files and key them by root element.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use porter_core::{PortalDataError, Resource, TypeKey};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, ScanError};
use crate::filter::FileFilter;

/// A file found by a scan together with the key of its root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedResource {
    pub resource: Resource,
    pub key: TypeKey,
}

/// Enumerates the data files under a directory.
#[async_trait]
pub trait DirectoryScanner: Send + Sync {
    /// Find every file under `root` accepted by `filter` and key it.
    ///
    /// Files whose root element cannot be read are skipped with a warning when
    /// `ignore_non_data_files` is set, and fail the scan otherwise.
    async fn scan(
        &self,
        root: &Path,
        filter: &FileFilter,
        ignore_non_data_files: bool,
    ) -> Result<Vec<ScannedResource>>;
}

/// Scanner that walks the file tree and peeks root elements concurrently.
#[derive(Debug, Clone)]
pub struct GlobDirectoryScanner {
    concurrency: usize,
}

impl Default for GlobDirectoryScanner {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get(),
        }
    }
}

impl GlobDirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many files are read at once while keying.
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Collect matching files, pruning excluded directories (runs on a blocking thread)
    fn walk(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                !filter.is_excluded_dir(relative)
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if filter.is_match(relative) {
                files.push(entry.into_path());
            }
        }

        // Sort for consistent results
        files.sort();
        Ok(files)
    }

    async fn key_file(path: PathBuf, ignore_non_data_files: bool) -> Result<Option<ScannedResource>> {
        let resource = Resource::file(&path);
        match resource.peek_root().await {
            Ok(root) => {
                let key = TypeKey::from_root(&root);
                debug!(file = %path.display(), %key, "Keyed data file");
                Ok(Some(ScannedResource { resource, key }))
            }
            Err(e @ PortalDataError::Decode { .. }) if ignore_non_data_files => {
                warn!(file = %path.display(), error = %e, "Ignoring non-data file");
                Ok(None)
            }
            Err(source @ PortalDataError::Decode { .. }) => Err(ScanError::NotData { path, source }),
            Err(e) => Err(ScanError::Read(e)),
        }
    }
}

#[async_trait]
impl DirectoryScanner for GlobDirectoryScanner {
    async fn scan(
        &self,
        root: &Path,
        filter: &FileFilter,
        ignore_non_data_files: bool,
    ) -> Result<Vec<ScannedResource>> {
        if !root.is_dir() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }

        let walk_root = root.to_path_buf();
        let walk_filter = filter.clone();
        let files = tokio::task::spawn_blocking(move || Self::walk(&walk_root, &walk_filter))
            .await
            .map_err(|e| ScanError::Task(e.to_string()))??;

        let matched = files.len();
        let mut scanned: Vec<ScannedResource> = stream::iter(files)
            .map(|path| Self::key_file(path, ignore_non_data_files))
            .buffer_unordered(self.concurrency)
            .try_filter_map(|found| async move { Ok(found) })
            .try_collect()
            .await?;

        scanned.sort_by(|a, b| a.resource.path().cmp(&b.resource.path()));
        info!(
            root = %root.display(),
            matched,
            keyed = scanned.len(),
            "Scanned directory for data files"
        );
        Ok(scanned)
    }
}
