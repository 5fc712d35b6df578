//! Portal data service: the single entry point for imports, exports and deletes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use porter_config::PortalDataConfig;
use porter_core::{DataRecord, PortalDataType, Resource, Result};
use porter_scan::{DirectoryScanner, GlobDirectoryScanner};
use tracing::debug;

use crate::batch_import::{BatchImportOptions, BatchImporter, ImportReport};
use crate::export::{BatchExportOptions, ExportOrchestrator};
use crate::import::ImportPipeline;
use crate::pool::WorkerPool;
use crate::registry::PortalDataRegistry;

/// Wires a registry, worker pool and scanner into the public operations.
///
/// # Architecture
///
/// ```text
/// PortalDataService
///   ├─> BatchImporter ──> DirectoryScanner, BatchTracker
///   │         └────────> ImportPipeline ──> dispatch (importers, upgraders)
///   └─> ExportOrchestrator ──> BatchTracker, exporters, deleters
/// ```
pub struct PortalDataService {
    registry: Arc<PortalDataRegistry>,
    pipeline: Arc<ImportPipeline>,
    importer: BatchImporter,
    exporter: ExportOrchestrator,
}

impl PortalDataService {
    /// Create a service that scans directories with [`GlobDirectoryScanner`].
    pub fn new(registry: Arc<PortalDataRegistry>, config: PortalDataConfig) -> Self {
        Self::with_scanner(registry, config, Arc::new(GlobDirectoryScanner::new()))
    }

    /// Create a service with a custom directory scanner.
    pub fn with_scanner(
        registry: Arc<PortalDataRegistry>,
        config: PortalDataConfig,
        scanner: Arc<dyn DirectoryScanner>,
    ) -> Self {
        let pool = WorkerPool::new(config.workers.pool_size);
        let max_wait = config.workers.max_wait();
        debug!(
            pool_size = pool.size(),
            import_keys = registry.import_order().len(),
            "Creating portal data service"
        );

        let pipeline = Arc::new(ImportPipeline::new(Arc::clone(&registry)));
        let importer = BatchImporter::new(
            Arc::clone(&pipeline),
            scanner,
            pool.clone(),
            config.import,
            max_wait,
        );
        let exporter = ExportOrchestrator::new(Arc::clone(&registry), pool, max_wait);

        Self {
            registry,
            pipeline,
            importer,
            exporter,
        }
    }

    pub fn registry(&self) -> &Arc<PortalDataRegistry> {
        &self.registry
    }

    /// Import every data file under `directory`.
    pub async fn import_batch(
        &self,
        directory: &Path,
        pattern: Option<&str>,
        options: Option<BatchImportOptions>,
    ) -> Result<ImportReport> {
        self.importer.import_batch(directory, pattern, options).await
    }

    /// Import one document from a path or `file:` location.
    pub async fn import_location(&self, location: &str) -> Result<()> {
        self.import_resource(&Resource::from_location(location)).await
    }

    /// Import one document.
    pub async fn import_resource(&self, resource: &Resource) -> Result<()> {
        self.pipeline.import_resource(resource, None).await
    }

    pub async fn export_data(
        &self,
        type_id: &str,
        data_id: &str,
        sink: &mut (dyn Write + Send),
    ) -> Result<Option<String>> {
        self.exporter.export_data(type_id, data_id, sink).await
    }

    pub async fn export_to_directory(
        &self,
        type_id: &str,
        data_id: &str,
        directory: &Path,
    ) -> Result<Option<PathBuf>> {
        self.exporter
            .export_to_directory(type_id, data_id, directory)
            .await
    }

    pub async fn export_all(&self, directory: &Path, options: Option<BatchExportOptions>) -> Result<()> {
        self.exporter.export_all(directory, options).await
    }

    pub async fn export_all_of_types<I, S>(
        &self,
        type_ids: I,
        directory: &Path,
        options: Option<BatchExportOptions>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exporter
            .export_all_of_types(type_ids, directory, options)
            .await
    }

    pub async fn delete_data(&self, type_id: &str, data_id: &str) -> Result<bool> {
        self.exporter.delete_data(type_id, data_id).await
    }

    pub fn data_types(&self) -> Vec<Arc<dyn PortalDataType>> {
        self.exporter.data_types()
    }

    pub fn deletable_data_types(&self) -> Vec<Arc<dyn PortalDataType>> {
        self.exporter.deletable_data_types()
    }

    pub async fn list_data(&self, type_id: &str) -> Result<Vec<DataRecord>> {
        self.exporter.list_data(type_id).await
    }
}
