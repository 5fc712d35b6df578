//! Import Orchestrator
//!
//! Imports every data file under a directory. Files are keyed by a scan, then
//! imported one key at a time in the registry's import order. All files of a
//! key run concurrently on the worker pool and must finish before the next key
//! starts, so data that other data refers to is always in place first.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use porter_config::ImportConfig;
use porter_core::{PortalDataError, Resource, Result, TypeKey};
use porter_scan::{DirectoryScanner, FileFilter, ScannedResource};
use tracing::info;

use crate::import::ImportPipeline;
use crate::pool::WorkerPool;
use crate::tracker::{BatchTracker, TaskHandle, TaskKind};

/// Per-batch import settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchImportOptions {
    /// Halt on the first failed file and report every failure
    pub fail_on_error: bool,
    /// Skip files that are not XML instead of failing the scan
    pub ignore_non_data_files: bool,
}

impl Default for BatchImportOptions {
    fn default() -> Self {
        Self {
            fail_on_error: true,
            ignore_non_data_files: false,
        }
    }
}

impl BatchImportOptions {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            fail_on_error: config.fail_on_error,
            ignore_non_data_files: config.ignore_non_data_files,
        }
    }
}

/// Files processed by a batch, per key, in import order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    groups: Vec<(TypeKey, usize)>,
}

impl ImportReport {
    pub fn groups(&self) -> &[(TypeKey, usize)] {
        &self.groups
    }

    pub fn files_for(&self, key: &TypeKey) -> usize {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, n)| *n)
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, n)| n).sum()
    }
}

/// Runs batch imports of directories.
pub struct BatchImporter {
    pipeline: Arc<ImportPipeline>,
    scanner: Arc<dyn DirectoryScanner>,
    pool: WorkerPool,
    config: ImportConfig,
    max_wait: Option<Duration>,
}

impl BatchImporter {
    pub fn new(
        pipeline: Arc<ImportPipeline>,
        scanner: Arc<dyn DirectoryScanner>,
        pool: WorkerPool,
        config: ImportConfig,
        max_wait: Option<Duration>,
    ) -> Self {
        Self {
            pipeline,
            scanner,
            pool,
            config,
            max_wait,
        }
    }

    /// Import every data file under `root`.
    ///
    /// `pattern` replaces the configured include globs; excludes always apply.
    /// Without `options`, the configured defaults are used.
    ///
    /// # Errors
    ///
    /// - [`PortalDataError::Configuration`] if `root` is not a directory, a glob
    ///   is invalid, or scanned files have keys missing from the import order
    /// - [`PortalDataError::Batch`] if files failed and `fail_on_error` is set;
    ///   keys after the failing one are not imported
    pub async fn import_batch(
        &self,
        root: &Path,
        pattern: Option<&str>,
        options: Option<BatchImportOptions>,
    ) -> Result<ImportReport> {
        let options = options.unwrap_or_else(|| BatchImportOptions::from_config(&self.config));
        if !root.is_dir() {
            return Err(PortalDataError::Configuration(format!(
                "Import directory does not exist: {}",
                root.display()
            )));
        }

        let filter = FileFilter::from_config(&self.config, pattern)?;
        let scanned = self
            .scanner
            .scan(root, &filter, options.ignore_non_data_files)
            .await?;
        info!(
            root = %root.display(),
            files = scanned.len(),
            fail_on_error = options.fail_on_error,
            "Starting batch import"
        );

        let mut buckets: HashMap<TypeKey, VecDeque<Resource>> = HashMap::new();
        for ScannedResource { resource, key } in scanned {
            buckets.entry(key).or_default().push_back(resource);
        }

        let mut tracker = BatchTracker::new(options.fail_on_error, self.max_wait);
        let mut report = ImportReport::default();
        for key in self.pipeline.registry().import_order() {
            let Some(resources) = buckets.remove(key) else {
                continue;
            };
            let count = resources.len();
            info!("Importing {} files of type {}", count, key);

            for resource in resources {
                tracker.probe().await?;
                let description = resource.description();
                let pipeline = Arc::clone(&self.pipeline);
                let task_key = key.clone();
                let handle = self.pool.submit(async move {
                    pipeline.import_resource(&resource, Some(task_key)).await
                });
                tracker.push(TaskHandle::new(handle, TaskKind::Import, description));
            }

            tracker.drain().await?;
            report.groups.push((key.clone(), count));
        }

        if !buckets.is_empty() {
            let mut orphans: Vec<String> = buckets
                .iter()
                .map(|(key, resources)| format!("{} ({} files)", key, resources.len()))
                .collect();
            orphans.sort();
            return Err(PortalDataError::Configuration(format!(
                "No data type is registered for scanned keys: {}",
                orphans.join(", ")
            )));
        }

        info!(
            root = %root.display(),
            files = report.total(),
            "Finished batch import"
        );
        Ok(report)
    }
}
