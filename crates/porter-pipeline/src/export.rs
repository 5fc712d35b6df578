//! Export Orchestrator
//!
//! Single-record exports, batch exports of whole data types, deletes and
//! listings. Batch exports write one file per record under
//! `<directory>/<typeId>/<fileName>.<typeId>.xml`, one data type at a time.
//!
//! Every file is first written to a temporary file beside its destination and
//! only moved into place once encoding succeeded, so a failed export never
//! leaves a partial file behind.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use porter_core::{DataRecord, ExportHandler, PortalDataError, PortalDataType, Result};
use tracing::{info, warn};

use crate::pool::WorkerPool;
use crate::registry::PortalDataRegistry;
use crate::tracker::{BatchTracker, TaskHandle, TaskKind};

/// Per-batch export settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchExportOptions {
    /// Halt on the first failed record and report every failure
    pub fail_on_error: bool,
}

impl Default for BatchExportOptions {
    fn default() -> Self {
        Self {
            fail_on_error: true,
        }
    }
}

/// Runs exports and deletes against the registered handlers.
#[derive(Debug, Clone)]
pub struct ExportOrchestrator {
    registry: Arc<PortalDataRegistry>,
    pool: WorkerPool,
    max_wait: Option<Duration>,
}

impl ExportOrchestrator {
    pub fn new(registry: Arc<PortalDataRegistry>, pool: WorkerPool, max_wait: Option<Duration>) -> Self {
        Self {
            registry,
            pool,
            max_wait,
        }
    }

    /// Encode one record into `sink`.
    ///
    /// Returns the record's file name, or `None` if it does not exist.
    pub async fn export_data(
        &self,
        type_id: &str,
        data_id: &str,
        sink: &mut (dyn Write + Send),
    ) -> Result<Option<String>> {
        let exporter = self.registry.exporter_for(type_id)?;
        let file_name = exporter.export_into(data_id, sink).await?;
        if file_name.is_none() {
            info!(type_id, data_id, "No data found to export");
        }
        Ok(file_name)
    }

    /// Export one record to `directory/<fileName>.<typeId>.xml`.
    ///
    /// Returns the written path, or `None` if the record does not exist.
    pub async fn export_to_directory(
        &self,
        type_id: &str,
        data_id: &str,
        directory: &Path,
    ) -> Result<Option<PathBuf>> {
        let exporter = Arc::clone(self.registry.exporter_for(type_id)?);
        export_to_file(exporter, type_id, data_id, directory).await
    }

    /// Export every record of each type, one type at a time.
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
        let options = options.unwrap_or_default();
        let mut tracker = BatchTracker::new(options.fail_on_error, self.max_wait);

        for type_id in type_ids {
            let type_id = type_id.as_ref();
            let exporter = Arc::clone(self.registry.exporter_for(type_id)?);
            let type_dir = directory.join(type_id);
            tokio::fs::create_dir_all(&type_dir)
                .await
                .map_err(|e| PortalDataError::io(format!("creating {}", type_dir.display()), e))?;

            let records = exporter.records().await?;
            info!(
                "Exporting {} records of type {} to {}",
                records.len(),
                type_id,
                type_dir.display()
            );

            for record in records {
                tracker.probe().await?;
                let description = format!("type={}, dataId={}", type_id, record.data_id);
                let exporter = Arc::clone(&exporter);
                let task_type = type_id.to_string();
                let task_dir = type_dir.clone();
                let handle = self.pool.submit(async move {
                    export_to_file(exporter, &task_type, &record.data_id, &task_dir)
                        .await
                        .map(|_| ())
                });
                tracker.push(TaskHandle::new(handle, TaskKind::Export, description));
            }

            tracker.drain().await?;
        }
        Ok(())
    }

    /// Export every record of every exportable type.
    pub async fn export_all(&self, directory: &Path, options: Option<BatchExportOptions>) -> Result<()> {
        let type_ids: Vec<String> = self
            .registry
            .export_data_types()
            .iter()
            .map(|t| t.type_id().to_string())
            .collect();
        self.export_all_of_types(type_ids, directory, options).await
    }

    /// Delete one record; `false` when nothing matched.
    pub async fn delete_data(&self, type_id: &str, data_id: &str) -> Result<bool> {
        let deleter = self.registry.deleter_for(type_id)?;
        let deleted = deleter.delete(data_id).await?;
        if deleted {
            info!(type_id, data_id, "Deleted data");
        } else {
            info!(type_id, data_id, "No data found to delete");
        }
        Ok(deleted)
    }

    /// Exportable data types in registration order.
    pub fn data_types(&self) -> Vec<Arc<dyn PortalDataType>> {
        self.registry.export_data_types().to_vec()
    }

    /// Deletable data types in registration order.
    pub fn deletable_data_types(&self) -> Vec<Arc<dyn PortalDataType>> {
        self.registry.delete_data_types().to_vec()
    }

    /// Records available for export of one type.
    pub async fn list_data(&self, type_id: &str) -> Result<Vec<DataRecord>> {
        self.registry.exporter_for(type_id)?.records().await
    }
}

/// Encode one record beside its destination, then move it into place.
async fn export_to_file(
    exporter: Arc<dyn ExportHandler>,
    type_id: &str,
    data_id: &str,
    directory: &Path,
) -> Result<Option<PathBuf>> {
    tokio::fs::create_dir_all(directory)
        .await
        .map_err(|e| PortalDataError::io(format!("creating {}", directory.display()), e))?;

    let mut encoded = Vec::new();
    let Some(file_name) = exporter.export_into(data_id, &mut encoded).await? else {
        info!(type_id, data_id, "No data found to export");
        return Ok(None);
    };

    let destination = directory.join(format!("{}.{}.xml", file_name, type_id));
    let exists = tokio::fs::try_exists(&destination)
        .await
        .map_err(|e| PortalDataError::io(format!("checking {}", destination.display()), e))?;
    if exists {
        warn!(
            destination = %destination.display(),
            "Export destination exists and will be overwritten"
        );
    }

    // Temp file names need a prefix of at least two characters
    let prefix = format!("{:-<2}-", data_id);
    let suffix = format!(".{}", type_id);
    let temp_dir = directory.to_path_buf();
    let target = destination.clone();
    tokio::task::spawn_blocking(move || write_atomically(&temp_dir, &prefix, &suffix, &encoded, &target))
        .await
        .map_err(|e| PortalDataError::handler(format!("writing {}", destination.display()), e))??;

    info!(type_id, data_id, destination = %destination.display(), "Exported data");
    Ok(Some(destination))
}

/// Write `content` to a temp file in `directory` and move it over `destination`.
///
/// Runs on a blocking thread. The temp file is removed when any step fails.
fn write_atomically(
    directory: &Path,
    prefix: &str,
    suffix: &str,
    content: &[u8],
    destination: &Path,
) -> Result<()> {
    let mut temp = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(directory)
        .map_err(|e| PortalDataError::io(format!("creating temp file in {}", directory.display()), e))?;
    temp.write_all(content)
        .map_err(|e| PortalDataError::io(format!("writing {}", temp.path().display()), e))?;
    temp.persist(destination).map_err(|e| {
        PortalDataError::io(format!("moving export to {}", destination.display()), e.error)
    })?;
    Ok(())
}
