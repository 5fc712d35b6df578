//! Type Registry
//!
//! Maps type keys to the handlers that process them and fixes the global
//! import order. The registry is assembled once by [`RegistryBuilder`] and is
//! read-only afterwards, so it is shared between tasks as
//! `Arc<PortalDataRegistry>` without locking.
//!
//! ## Override Rules
//!
//! At most one handler exists per key (importers, upgraders) or per type id
//! (exporters, deleters). A later registration replaces an earlier one and the
//! replacement is logged at `warn`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use porter_core::{
    DataUpgrader, DeleteHandler, ExportHandler, ImportHandler, PortalDataError, PortalDataType,
    Result, TypeKey,
};
use tracing::{debug, warn};

/// Immutable lookup tables for every registered handler.
pub struct PortalDataRegistry {
    import_order: Vec<TypeKey>,
    positions: HashMap<TypeKey, usize>,
    key_types: HashMap<TypeKey, Arc<dyn PortalDataType>>,
    importers: HashMap<TypeKey, Arc<dyn ImportHandler>>,
    upgraders: HashMap<TypeKey, Arc<dyn DataUpgrader>>,
    exporters: HashMap<String, Arc<dyn ExportHandler>>,
    deleters: HashMap<String, Arc<dyn DeleteHandler>>,
    export_types: Vec<Arc<dyn PortalDataType>>,
    delete_types: Vec<Arc<dyn PortalDataType>>,
}

impl PortalDataRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Every registered key, in the order batch imports process them.
    pub fn import_order(&self) -> &[TypeKey] {
        &self.import_order
    }

    /// Index of `key` in the import order.
    pub fn import_position(&self, key: &TypeKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn data_type_for(&self, key: &TypeKey) -> Option<&Arc<dyn PortalDataType>> {
        self.key_types.get(key)
    }

    pub fn importer_for(&self, key: &TypeKey) -> Option<&Arc<dyn ImportHandler>> {
        self.importers.get(key)
    }

    pub fn upgrader_for(&self, key: &TypeKey) -> Option<&Arc<dyn DataUpgrader>> {
        self.upgraders.get(key)
    }

    /// Exporter for a type id.
    ///
    /// # Errors
    ///
    /// Returns [`PortalDataError::Configuration`] when no exporter is registered.
    pub fn exporter_for(&self, type_id: &str) -> Result<&Arc<dyn ExportHandler>> {
        self.exporters.get(type_id).ok_or_else(|| {
            PortalDataError::Configuration(format!("No exporter registered for type '{}'", type_id))
        })
    }

    /// Deleter for a type id.
    ///
    /// # Errors
    ///
    /// Returns [`PortalDataError::Configuration`] when no deleter is registered.
    pub fn deleter_for(&self, type_id: &str) -> Result<&Arc<dyn DeleteHandler>> {
        self.deleters.get(type_id).ok_or_else(|| {
            PortalDataError::Configuration(format!("No deleter registered for type '{}'", type_id))
        })
    }

    /// Exportable data types in registration order.
    pub fn export_data_types(&self) -> &[Arc<dyn PortalDataType>] {
        &self.export_types
    }

    /// Deletable data types in registration order.
    pub fn delete_data_types(&self) -> &[Arc<dyn PortalDataType>] {
        &self.delete_types
    }
}

impl fmt::Debug for PortalDataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalDataRegistry")
            .field("import_order", &self.import_order)
            .field("importers", &self.importers.len())
            .field("upgraders", &self.upgraders.len())
            .field("exporters", &self.exporters.keys().collect::<Vec<_>>())
            .field("deleters", &self.deleters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects handlers in any order and assembles a [`PortalDataRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    data_types: Vec<Arc<dyn PortalDataType>>,
    importers: Vec<Arc<dyn ImportHandler>>,
    upgraders: Vec<Arc<dyn DataUpgrader>>,
    exporters: Vec<Arc<dyn ExportHandler>>,
    deleters: Vec<Arc<dyn DeleteHandler>>,
}

impl RegistryBuilder {
    /// Add a data type; types contribute their keys to the import order in the order added.
    pub fn data_type(mut self, data_type: Arc<dyn PortalDataType>) -> Self {
        self.data_types.push(data_type);
        self
    }

    pub fn data_types(mut self, data_types: impl IntoIterator<Item = Arc<dyn PortalDataType>>) -> Self {
        self.data_types.extend(data_types);
        self
    }

    pub fn importer(mut self, importer: Arc<dyn ImportHandler>) -> Self {
        self.importers.push(importer);
        self
    }

    pub fn upgrader(mut self, upgrader: Arc<dyn DataUpgrader>) -> Self {
        self.upgraders.push(upgrader);
        self
    }

    pub fn exporter(mut self, exporter: Arc<dyn ExportHandler>) -> Self {
        self.exporters.push(exporter);
        self
    }

    pub fn deleter(mut self, deleter: Arc<dyn DeleteHandler>) -> Self {
        self.deleters.push(deleter);
        self
    }

    pub fn build(self) -> PortalDataRegistry {
        let mut import_order = Vec::new();
        let mut positions = HashMap::new();
        let mut key_types: HashMap<TypeKey, Arc<dyn PortalDataType>> = HashMap::new();

        for data_type in &self.data_types {
            for key in data_type.data_key_import_order() {
                if let Some(previous) = key_types.insert(key.clone(), Arc::clone(data_type)) {
                    warn!(
                        %key,
                        previous = previous.type_id(),
                        replacement = data_type.type_id(),
                        "Replacing data type for key"
                    );
                }
                if !positions.contains_key(&key) {
                    positions.insert(key.clone(), import_order.len());
                    import_order.push(key);
                }
            }
            debug!(type_id = data_type.type_id(), "Registered data type");
        }

        let mut importers: HashMap<TypeKey, Arc<dyn ImportHandler>> = HashMap::new();
        for importer in self.importers {
            for key in importer.supported_keys() {
                debug!(%key, importer = importer.handler_name(), "Registered importer");
                if let Some(previous) = importers.insert(key.clone(), Arc::clone(&importer)) {
                    warn!(
                        %key,
                        previous = previous.handler_name(),
                        replacement = importer.handler_name(),
                        "Replacing importer for key"
                    );
                }
            }
        }

        let mut upgraders: HashMap<TypeKey, Arc<dyn DataUpgrader>> = HashMap::new();
        for upgrader in self.upgraders {
            for key in upgrader.source_keys() {
                debug!(%key, upgrader = upgrader.name(), "Registered upgrader");
                if let Some(previous) = upgraders.insert(key.clone(), Arc::clone(&upgrader)) {
                    warn!(
                        %key,
                        previous = previous.name(),
                        replacement = upgrader.name(),
                        "Replacing upgrader for key"
                    );
                }
            }
        }

        let mut exporters = HashMap::new();
        let mut export_types = Vec::new();
        for exporter in self.exporters {
            let data_type = exporter.portal_data_type();
            register_by_type_id(&mut exporters, &mut export_types, data_type, exporter, "exporter");
        }

        let mut deleters = HashMap::new();
        let mut delete_types = Vec::new();
        for deleter in self.deleters {
            let data_type = deleter.portal_data_type();
            register_by_type_id(&mut deleters, &mut delete_types, data_type, deleter, "deleter");
        }

        PortalDataRegistry {
            import_order,
            positions,
            key_types,
            importers,
            upgraders,
            exporters,
            deleters,
            export_types,
            delete_types,
        }
    }
}

/// Insert a type-keyed handler, keeping `types` deduplicated in first-registration order.
fn register_by_type_id<H: ?Sized>(
    handlers: &mut HashMap<String, Arc<H>>,
    types: &mut Vec<Arc<dyn PortalDataType>>,
    data_type: Arc<dyn PortalDataType>,
    handler: Arc<H>,
    kind: &str,
) {
    let type_id = data_type.type_id().to_string();
    debug!(type_id = %type_id, kind, "Registered handler");

    if handlers.insert(type_id.clone(), handler).is_some() {
        warn!(type_id = %type_id, kind, "Replacing handler for data type");
        if let Some(slot) = types.iter_mut().find(|t| t.type_id() == type_id) {
            *slot = data_type;
        }
    } else {
        types.push(data_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use porter_core::BasicDataType;

    fn data_type(type_id: &str, keys: &[&str]) -> Arc<dyn PortalDataType> {
        Arc::new(BasicDataType::new(
            type_id,
            keys.iter().map(|k| TypeKey::local(*k)).collect(),
        ))
    }

    #[test]
    fn import_order_flattens_types_then_keys() {
        let registry = PortalDataRegistry::builder()
            .data_type(data_type("group", &["group-v3", "group"]))
            .data_type(data_type("user", &["user", "membership"]))
            .build();

        let order: Vec<_> = registry
            .import_order()
            .iter()
            .map(|k| k.name().local_name.as_str())
            .collect();
        assert_eq!(order, vec!["group-v3", "group", "user", "membership"]);
        assert_eq!(registry.import_position(&TypeKey::local("user")), Some(2));
    }

    #[test]
    fn duplicate_key_keeps_first_position_and_last_type() {
        let registry = PortalDataRegistry::builder()
            .data_type(data_type("first", &["shared", "a"]))
            .data_type(data_type("second", &["b", "shared"]))
            .build();

        let shared = TypeKey::local("shared");
        assert_eq!(registry.import_order().len(), 3);
        assert_eq!(registry.import_position(&shared), Some(0));
        assert_eq!(registry.data_type_for(&shared).unwrap().type_id(), "second");
    }

    #[test]
    fn missing_exporter_and_deleter_are_configuration_errors() {
        let registry = PortalDataRegistry::builder().build();

        assert!(matches!(
            registry.exporter_for("user"),
            Err(PortalDataError::Configuration(_))
        ));
        assert!(matches!(
            registry.deleter_for("user"),
            Err(PortalDataError::Configuration(_))
        ));
        assert!(registry.export_data_types().is_empty());
    }
}
