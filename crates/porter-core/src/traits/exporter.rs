//! Exporters enumerate and encode records of one data type.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;

use super::data_type::PortalDataType;
use crate::data::DataRecord;
use crate::error::{PortalDataError, Result};

/// Typed exporter for a single data type.
#[async_trait]
pub trait DataExporter: Send + Sync + 'static {
    /// Domain object fetched for export
    type Data: Send + 'static;

    /// Data type this exporter serves
    fn data_type(&self) -> Arc<dyn PortalDataType>;

    /// Every record that can be exported
    async fn list_data(&self) -> anyhow::Result<Vec<DataRecord>>;

    /// Fetch one object, `None` when it does not exist
    async fn export_data(&self, data_id: &str) -> anyhow::Result<Option<Self::Data>>;

    /// Encode an object as XML into `sink`
    fn encode(&self, data: &Self::Data, sink: &mut dyn Write) -> anyhow::Result<()>;

    /// Base file name (without type suffix or extension) for an object
    fn file_name(&self, data: &Self::Data) -> String;
}

/// Object-safe exporter stored by the registry.
#[async_trait]
pub trait ExportHandler: Send + Sync {
    /// Data type this handler serves
    fn portal_data_type(&self) -> Arc<dyn PortalDataType>;

    /// Records available for export
    async fn records(&self) -> Result<Vec<DataRecord>>;

    /// Fetch and encode one object into `sink`.
    ///
    /// Returns the object's file name, or `None` if it does not exist, in which
    /// case nothing is written.
    async fn export_into(&self, data_id: &str, sink: &mut (dyn Write + Send)) -> Result<Option<String>>;
}

#[async_trait]
impl<T: DataExporter> ExportHandler for T {
    fn portal_data_type(&self) -> Arc<dyn PortalDataType> {
        self.data_type()
    }

    async fn records(&self) -> Result<Vec<DataRecord>> {
        self.list_data().await.map_err(|e| {
            PortalDataError::handler(format!("listing {}", self.data_type().type_id()), e)
        })
    }

    async fn export_into(&self, data_id: &str, sink: &mut (dyn Write + Send)) -> Result<Option<String>> {
        let context = format!("type={}, dataId={}", self.data_type().type_id(), data_id);
        let data = self
            .export_data(data_id)
            .await
            .map_err(|e| PortalDataError::handler(format!("exporting {}", context), e))?;
        let Some(data) = data else {
            return Ok(None);
        };

        self.encode(&data, sink)
            .map_err(|e| PortalDataError::encode(context, e))?;
        Ok(Some(self.file_name(&data)))
    }
}
