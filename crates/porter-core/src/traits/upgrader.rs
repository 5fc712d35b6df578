//! Upgraders rewrite documents from older formats.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::document::{DocumentCursor, DocumentSink};
use crate::key::TypeKey;

/// What the dispatcher should do after an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The sink holds an upgraded document that still has to be imported.
    NeedsImport,
    /// The upgrader imported the data itself; the sink is ignored.
    Imported,
}

/// Converts documents of older keys into a newer format.
///
/// Upgrades chain: the document written to the sink is keyed again from its
/// root element and dispatched like a freshly loaded file, so it may reach
/// another upgrader before an importer.
#[async_trait]
pub trait DataUpgrader: Send + Sync {
    /// Keys this upgrader accepts
    fn source_keys(&self) -> HashSet<TypeKey>;

    /// Read the old document from `source` and write its replacement to `sink`
    async fn upgrade(
        &self,
        source: &mut DocumentCursor,
        sink: &mut DocumentSink,
    ) -> anyhow::Result<UpgradeOutcome>;

    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
