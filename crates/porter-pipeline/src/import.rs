//! Resource Import Pipeline
//!
//! Imports a single resource:
//!
//! 1. **Load**: decode the resource once into an [`XmlDocument`]
//! 2. **Key**: derive the [`TypeKey`] from the root element unless the caller
//!    already knows it
//! 3. **Post-process**: let the key's data type expand the key into one or more
//!    import targets
//! 4. **Dispatch**: hand each target to an importer or upgrader (see
//!    [`dispatch`](crate::dispatch)); several targets run in the global import
//!    order
//!
//! Upgraded documents re-enter at step 2 without touching the resource again.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use porter_core::{DocumentCursor, PortalDataError, Resource, Result, TypeKey, XmlDocument};
use tracing::{debug, warn};

use crate::registry::PortalDataRegistry;

/// Imports single resources using the handlers of a registry.
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    registry: Arc<PortalDataRegistry>,
}

impl ImportPipeline {
    pub fn new(registry: Arc<PortalDataRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<PortalDataRegistry> {
        &self.registry
    }

    /// Import one resource.
    ///
    /// `known_key` skips keying when the caller (a batch scan) already peeked
    /// the root element.
    pub async fn import_resource(&self, resource: &Resource, known_key: Option<TypeKey>) -> Result<()> {
        let document = resource.load().await?;
        self.import_document(resource, Arc::new(document), known_key)
            .await
    }

    /// Key, post-process and dispatch a loaded document.
    ///
    /// Boxed so upgrade chains can recurse through the dispatcher.
    pub(crate) fn import_document<'a>(
        &'a self,
        resource: &'a Resource,
        document: Arc<XmlDocument>,
        known_key: Option<TypeKey>,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let mut cursor = DocumentCursor::new(document);
            let key = match known_key {
                Some(key) => key,
                None => TypeKey::from_root(&cursor.peek_root()?),
            };

            let data_type = self.registry.data_type_for(&key).ok_or_else(|| {
                PortalDataError::unsupported(key.clone(), cursor.origin(), "no data type registered")
            })?;

            let processed = data_type.post_process_key(resource, &key, &mut cursor);
            cursor.reset();
            let mut keys = processed.map_err(|e| PortalDataError::decode(cursor.origin(), e))?;

            if keys.len() <= 1 {
                let Some(target) = keys.drain().next() else {
                    return Err(PortalDataError::unsupported(
                        key,
                        cursor.origin(),
                        "post-processing produced no keys",
                    ));
                };
                return self.dispatch(resource, target, &mut cursor).await;
            }

            debug!(
                origin = cursor.origin(),
                %key,
                targets = keys.len(),
                "Document expands to several imports"
            );
            for ordered in self.registry.import_order() {
                if keys.remove(ordered) {
                    cursor.reset();
                    self.dispatch(resource, ordered.clone(), &mut cursor).await?;
                }
            }
            for skipped in keys {
                warn!(
                    origin = cursor.origin(),
                    key = %skipped,
                    "Post-processed key is not in the import order, skipping"
                );
            }
            Ok(())
        }
        .boxed()
    }
}
