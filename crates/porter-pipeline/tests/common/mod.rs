//! Common test utilities for pipeline tests.
//!
//! Mock handlers record what they did in shared logs so tests can assert on
//! ordering and side effects.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use porter_config::PortalDataConfig;
use porter_core::{
    BasicDataType, DataDeleter, DataExporter, DataImporter, DataRecord, DataUpgrader,
    DocumentCursor, DocumentSink, PortalDataType, Resource, TypeKey, UpgradeOutcome,
};
use tempfile::TempDir;

/// Key with a local root name and a version attribute.
pub fn key(name: &str, version: &str) -> TypeKey {
    TypeKey::local(name).with_version(version)
}

/// Data type accepting the given keys in order.
pub fn data_type(type_id: &str, keys: Vec<TypeKey>) -> Arc<dyn PortalDataType> {
    Arc::new(BasicDataType::new(type_id, keys))
}

/// Configuration with a small pool and no per-task wait limit.
pub fn test_config(pool_size: usize) -> PortalDataConfig {
    let mut config = PortalDataConfig::default();
    config.workers.pool_size = pool_size;
    config
}

/// Write a file below `root`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

/// Temporary directory holding the given files.
pub fn data_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (relative, content) in files {
        write_file(dir.path(), relative, content);
    }
    dir
}

/// Ordered record of handler activity shared between tasks.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog(Arc<Mutex<Vec<String>>>);

impl ActivityLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// Importer that logs `<root>@<version>:<name>` for every import.
pub struct RecordingImporter {
    keys: HashSet<TypeKey>,
    log: ActivityLog,
    failing: HashSet<String>,
    delay: Duration,
}

impl RecordingImporter {
    pub fn new(keys: impl IntoIterator<Item = TypeKey>, log: &ActivityLog) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            log: log.clone(),
            failing: HashSet::new(),
            delay: Duration::ZERO,
        }
    }

    /// Fail imports of documents with this `name` attribute.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Sleep before each import.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl DataImporter for RecordingImporter {
    type Data = String;

    fn import_keys(&self) -> HashSet<TypeKey> {
        self.keys.clone()
    }

    fn decode(&self, cursor: &mut DocumentCursor) -> Result<String> {
        let root = cursor.peek_root()?;
        let name = root.attribute("name").unwrap_or("unnamed");
        Ok(format!(
            "{}@{}:{}",
            root.name.local_name,
            root.attribute("version").unwrap_or("-"),
            name
        ))
    }

    async fn import_data(&self, data: String) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.iter().any(|name| data.ends_with(&format!(":{}", name))) {
            anyhow::bail!("rejected {}", data);
        }
        self.log.push(data);
        Ok(())
    }
}

/// Upgrader that rewrites the root `version` attribute and asks for re-import.
pub struct VersionUpgrader {
    name: String,
    from: String,
    to: String,
    log: ActivityLog,
}

impl VersionUpgrader {
    pub fn new(name: &str, from: &str, to: &str, log: &ActivityLog) -> Self {
        Self {
            name: name.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl DataUpgrader for VersionUpgrader {
    fn source_keys(&self) -> HashSet<TypeKey> {
        HashSet::from([key(&self.name, &self.from)])
    }

    async fn upgrade(&self, source: &mut DocumentCursor, sink: &mut DocumentSink) -> Result<UpgradeOutcome> {
        let xml = source.read_to_string()?;
        let upgraded = xml.replacen(
            &format!(r#"version="{}""#, self.from),
            &format!(r#"version="{}""#, self.to),
            1,
        );
        sink.write_xml(&upgraded)?;
        self.log
            .push(format!("upgrade {}@{}->{}", self.name, self.from, self.to));
        Ok(UpgradeOutcome::NeedsImport)
    }
}

/// Upgrader that imports the data itself.
pub struct SelfImportingUpgrader {
    key: TypeKey,
    log: ActivityLog,
}

impl SelfImportingUpgrader {
    pub fn new(key: TypeKey, log: &ActivityLog) -> Self {
        Self {
            key,
            log: log.clone(),
        }
    }
}

#[async_trait]
impl DataUpgrader for SelfImportingUpgrader {
    fn source_keys(&self) -> HashSet<TypeKey> {
        HashSet::from([self.key.clone()])
    }

    async fn upgrade(&self, source: &mut DocumentCursor, _sink: &mut DocumentSink) -> Result<UpgradeOutcome> {
        let root = source.peek_root()?;
        self.log.push(format!(
            "upgraded-and-imported {}",
            root.attribute("name").unwrap_or("unnamed")
        ));
        Ok(UpgradeOutcome::Imported)
    }
}

/// Upgrader that writes nothing.
pub struct EmptyUpgrader(pub TypeKey);

#[async_trait]
impl DataUpgrader for EmptyUpgrader {
    fn source_keys(&self) -> HashSet<TypeKey> {
        HashSet::from([self.0.clone()])
    }

    async fn upgrade(&self, _source: &mut DocumentCursor, _sink: &mut DocumentSink) -> Result<UpgradeOutcome> {
        Ok(UpgradeOutcome::NeedsImport)
    }
}

/// Data type whose documents expand into a fixed set of keys.
#[derive(Debug)]
pub struct SplittingDataType {
    pub type_id: String,
    pub keys: Vec<TypeKey>,
    pub expands_to: Vec<TypeKey>,
}

impl PortalDataType for SplittingDataType {
    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn data_key_import_order(&self) -> Vec<TypeKey> {
        self.keys.clone()
    }

    fn post_process_key(
        &self,
        _resource: &Resource,
        _key: &TypeKey,
        cursor: &mut DocumentCursor,
    ) -> Result<HashSet<TypeKey>> {
        // Consume part of the document to prove the pipeline rewinds afterwards
        cursor.next_event();
        cursor.next_event();
        Ok(self.expands_to.iter().cloned().collect())
    }
}

/// Exporter and deleter over an in-memory map of `data_id -> name`.
pub struct MapStore {
    data_type: Arc<dyn PortalDataType>,
    records: Mutex<BTreeMap<String, String>>,
    fail_encode: bool,
}

impl MapStore {
    pub fn new(type_id: &str, records: &[(&str, &str)]) -> Self {
        Self {
            data_type: data_type(type_id, vec![]),
            records: Mutex::new(
                records
                    .iter()
                    .map(|(id, name)| (id.to_string(), name.to_string()))
                    .collect(),
            ),
            fail_encode: false,
        }
    }

    pub fn failing_encode(mut self) -> Self {
        self.fail_encode = true;
        self
    }

    pub fn contains(&self, data_id: &str) -> bool {
        self.records.lock().unwrap().contains_key(data_id)
    }
}

#[async_trait]
impl DataExporter for MapStore {
    type Data = (String, String);

    fn data_type(&self) -> Arc<dyn PortalDataType> {
        Arc::clone(&self.data_type)
    }

    async fn list_data(&self) -> Result<Vec<DataRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|(id, name)| DataRecord::new(id.as_str()).with_title(name.as_str()))
            .collect())
    }

    async fn export_data(&self, data_id: &str) -> Result<Option<Self::Data>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(data_id)
            .map(|name| (data_id.to_string(), name.clone())))
    }

    fn encode(&self, data: &Self::Data, sink: &mut dyn Write) -> Result<()> {
        // Write part of the document before failing, like a real encoder would
        write!(sink, "<{} id=\"{}\"", self.data_type.type_id(), data.0)?;
        if self.fail_encode {
            anyhow::bail!("cannot encode {}", data.0);
        }
        write!(sink, " name=\"{}\"/>", data.1)?;
        Ok(())
    }

    fn file_name(&self, data: &Self::Data) -> String {
        data.1.clone()
    }
}

#[async_trait]
impl DataDeleter for MapStore {
    type Data = String;

    fn data_type(&self) -> Arc<dyn PortalDataType> {
        Arc::clone(&self.data_type)
    }

    async fn delete_data(&self, data_id: &str) -> Result<Option<String>> {
        Ok(self.records.lock().unwrap().remove(data_id))
    }
}
