//! Import/Upgrade Dispatcher
//!
//! Chooses what happens to a document once its key is known:
//!
//! - an importer for the key decodes and imports it;
//! - otherwise an upgrader rewrites it, and the rewritten document goes back
//!   through the pipeline with a key derived from its new root element;
//! - otherwise the document is unsupported.
//!
//! Upgrade chains have no depth limit; a cycle between upgraders recurses
//! until it fails.

use std::sync::Arc;

use porter_core::{
    DocumentCursor, DocumentSink, PortalDataError, Resource, Result, TypeKey, UpgradeOutcome,
};
use tracing::{debug, info};

use crate::import::ImportPipeline;

impl ImportPipeline {
    /// Import or upgrade the document under `cursor` as `key`.
    pub(crate) async fn dispatch(
        &self,
        resource: &Resource,
        key: TypeKey,
        cursor: &mut DocumentCursor,
    ) -> Result<()> {
        let origin = cursor.origin().to_string();

        if let Some(importer) = self.registry().importer_for(&key) {
            debug!(origin = %origin, %key, importer = importer.handler_name(), "Importing document");
            importer.decode_and_import(cursor).await?;
            info!(origin = %origin, %key, "Imported document");
            return Ok(());
        }

        if let Some(upgrader) = self.registry().upgrader_for(&key) {
            let upgrader = Arc::clone(upgrader);
            debug!(origin = %origin, %key, upgrader = upgrader.name(), "Upgrading document");

            let mut sink = DocumentSink::new();
            let outcome = upgrader
                .upgrade(cursor, &mut sink)
                .await
                .map_err(|e| PortalDataError::upgrade(origin.clone(), e))?;

            return match outcome {
                UpgradeOutcome::Imported => {
                    info!(origin = %origin, %key, "Upgraded and imported document");
                    Ok(())
                }
                UpgradeOutcome::NeedsImport => {
                    if sink.is_empty() {
                        return Err(PortalDataError::upgrade(
                            origin,
                            format!("upgrader for {} produced an empty document", key),
                        ));
                    }
                    debug!(origin = %origin, from = %key, "Re-importing upgraded document");
                    let upgraded = Arc::new(sink.into_document(origin));
                    self.import_document(resource, upgraded, None).await
                }
            };
        }

        Err(PortalDataError::unsupported(
            key,
            origin,
            "no importer or upgrader registered",
        ))
    }
}
