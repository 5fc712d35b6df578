//! Deleters remove records of one data type.

use std::sync::Arc;

use async_trait::async_trait;

use super::data_type::PortalDataType;
use crate::error::{PortalDataError, Result};

/// Typed deleter for a single data type.
#[async_trait]
pub trait DataDeleter: Send + Sync + 'static {
    /// Domain object returned by a successful delete
    type Data: Send + 'static;

    /// Data type this deleter serves
    fn data_type(&self) -> Arc<dyn PortalDataType>;

    /// Delete one object, returning it, or `None` if it did not exist
    async fn delete_data(&self, data_id: &str) -> anyhow::Result<Option<Self::Data>>;
}

/// Object-safe deleter stored by the registry.
#[async_trait]
pub trait DeleteHandler: Send + Sync {
    fn portal_data_type(&self) -> Arc<dyn PortalDataType>;

    /// Delete one object; `false` when nothing matched `data_id`
    async fn delete(&self, data_id: &str) -> Result<bool>;
}

#[async_trait]
impl<T: DataDeleter> DeleteHandler for T {
    fn portal_data_type(&self) -> Arc<dyn PortalDataType> {
        self.data_type()
    }

    async fn delete(&self, data_id: &str) -> Result<bool> {
        let deleted = self.delete_data(data_id).await.map_err(|e| {
            PortalDataError::handler(
                format!("deleting type={}, dataId={}", self.data_type().type_id(), data_id),
                e,
            )
        })?;
        Ok(deleted.is_some())
    }
}
