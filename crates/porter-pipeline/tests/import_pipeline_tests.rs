//! Single-resource imports: keying, post-processing order and upgrade chains.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common::*;
use porter_core::codec::decode_xml;
use porter_core::{DataImporter, DocumentCursor, PortalDataError, Resource, TypeKey};
use porter_pipeline::{PortalDataRegistry, PortalDataService};
use serde::Deserialize;

fn service(registry: PortalDataRegistry) -> PortalDataService {
    PortalDataService::new(Arc::new(registry), test_config(2))
}

/// Decodes the whole document through the serde codec, so it only succeeds
/// when the cursor starts at the first event.
struct BundleImporter {
    key: TypeKey,
    log: ActivityLog,
}

#[derive(Debug, Deserialize)]
struct Bundle {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "part", default)]
    parts: Vec<String>,
}

#[async_trait]
impl DataImporter for BundleImporter {
    type Data = Bundle;

    fn import_keys(&self) -> HashSet<TypeKey> {
        HashSet::from([self.key.clone()])
    }

    fn decode(&self, cursor: &mut DocumentCursor) -> anyhow::Result<Bundle> {
        Ok(decode_xml(cursor)?)
    }

    async fn import_data(&self, bundle: Bundle) -> anyhow::Result<()> {
        self.log.push(format!(
            "{} {} ({} parts)",
            self.key.name().local_name,
            bundle.name,
            bundle.parts.len()
        ));
        Ok(())
    }
}

#[tokio::test]
async fn test_post_processed_keys_follow_global_order() {
    let log = ActivityLog::default();
    let (a, b, c) = (key("part-a", "1"), key("part-b", "1"), key("part-c", "1"));
    let registry = PortalDataRegistry::builder()
        .data_type(data_type("parts", vec![a.clone(), b.clone(), c.clone()]))
        .data_type(Arc::new(SplittingDataType {
            type_id: "bundle".to_string(),
            keys: vec![key("bundle", "1")],
            // Listed out of order on purpose
            expands_to: vec![b.clone(), a.clone()],
        }))
        .importer(Arc::new(BundleImporter { key: a, log: log.clone() }))
        .importer(Arc::new(BundleImporter { key: b, log: log.clone() }))
        .importer(Arc::new(BundleImporter { key: c, log: log.clone() }))
        .build();

    let resource = Resource::memory(
        "bundle",
        r#"<bundle version="1" name="x"><part>one</part><part>two</part></bundle>"#,
    );
    service(registry).import_resource(&resource).await.unwrap();

    assert_eq!(log.entries(), vec!["part-a x (2 parts)", "part-b x (2 parts)"]);
}

#[tokio::test]
async fn test_post_processed_keys_dispatch_in_import_order() {
    let log = ActivityLog::default();
    let (a, b) = (key("part-a", "1"), key("part-b", "1"));
    let bundle = key("bundle", "1");
    let registry = PortalDataRegistry::builder()
        .data_type(data_type("parts", vec![a.clone(), b.clone()]))
        .data_type(Arc::new(SplittingDataType {
            type_id: "bundle".to_string(),
            keys: vec![bundle],
            expands_to: vec![b.clone(), a.clone()],
        }))
        .upgrader(Arc::new(SelfImportingUpgrader::new(a, &log)))
        .importer(Arc::new(RecordingImporter::new([b], &log)))
        .build();

    let resource = Resource::memory("bundle", r#"<bundle version="1" name="x"/>"#);
    service(registry).import_resource(&resource).await.unwrap();

    assert_eq!(log.entries(), vec!["upgraded-and-imported x", "bundle@1:x"]);
}

#[tokio::test]
async fn test_upgrade_chain_imports_once_at_latest_version() {
    let log = ActivityLog::default();
    let registry = PortalDataRegistry::builder()
        .data_type(data_type(
            "user",
            vec![key("user", "1"), key("user", "2"), key("user", "3")],
        ))
        .upgrader(Arc::new(VersionUpgrader::new("user", "1", "2", &log)))
        .upgrader(Arc::new(VersionUpgrader::new("user", "2", "3", &log)))
        .importer(Arc::new(RecordingImporter::new([key("user", "3")], &log)))
        .build();

    let resource = Resource::memory("admin", r#"<user version="1" name="admin"/>"#);
    service(registry).import_resource(&resource).await.unwrap();

    assert_eq!(
        log.entries(),
        vec!["upgrade user@1->2", "upgrade user@2->3", "user@3:admin"]
    );
}

#[tokio::test]
async fn test_unregistered_key_is_unsupported() {
    let registry = PortalDataRegistry::builder()
        .data_type(data_type("user", vec![key("user", "4")]))
        .build();

    let resource = Resource::memory("stray", r#"<channel version="4"/>"#);
    let err = service(registry).import_resource(&resource).await.unwrap_err();

    assert!(matches!(
        err,
        PortalDataError::UnsupportedData { ref key, ref origin, .. }
            if key.name().local_name == "channel" && origin == "stray"
    ));
}

#[tokio::test]
async fn test_key_without_handler_is_unsupported() {
    let registry = PortalDataRegistry::builder()
        .data_type(data_type("user", vec![key("user", "4")]))
        .build();

    let resource = Resource::memory("orphan", r#"<user version="4"/>"#);
    let err = service(registry).import_resource(&resource).await.unwrap_err();

    assert!(err.to_string().contains("no importer or upgrader registered"));
}

#[tokio::test]
async fn test_empty_upgrade_output_is_an_upgrade_error() {
    let registry = PortalDataRegistry::builder()
        .data_type(data_type("user", vec![key("user", "1")]))
        .upgrader(Arc::new(EmptyUpgrader(key("user", "1"))))
        .build();

    let resource = Resource::memory("hollow", r#"<user version="1"/>"#);
    let err = service(registry).import_resource(&resource).await.unwrap_err();

    assert!(matches!(err, PortalDataError::Upgrade { ref origin, .. } if origin == "hollow"));
}

#[tokio::test]
async fn test_import_failure_carries_the_document() {
    let log = ActivityLog::default();
    let registry = PortalDataRegistry::builder()
        .data_type(data_type("user", vec![key("user", "4")]))
        .importer(Arc::new(
            RecordingImporter::new([key("user", "4")], &log).failing_on("guest"),
        ))
        .build();

    let resource = Resource::memory("guest.user.xml", r#"<user version="4" name="guest"/>"#);
    let err = service(registry).import_resource(&resource).await.unwrap_err();

    assert!(matches!(err, PortalDataError::Handler { .. }));
    assert!(err.to_string().contains("guest.user.xml"));
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn test_import_location_accepts_file_prefix() {
    let log = ActivityLog::default();
    let dir = data_dir(&[("users/admin.user.xml", r#"<user version="4" name="admin"/>"#)]);
    let registry = PortalDataRegistry::builder()
        .data_type(data_type("user", vec![key("user", "4")]))
        .importer(Arc::new(RecordingImporter::new([key("user", "4")], &log)))
        .build();
    let location = format!("file:{}", dir.path().join("users/admin.user.xml").display());

    service(registry).import_location(&location).await.unwrap();

    assert_eq!(log.entries(), vec!["user@4:admin"]);
}

#[tokio::test]
async fn test_namespaced_keys_resolve() {
    let log = ActivityLog::default();
    let layout = TypeKey::new(porter_core::QualifiedName::namespaced("urn:portal:layout", "layout"))
        .with_version("4");
    let registry = PortalDataRegistry::builder()
        .data_type(data_type("layout", vec![layout.clone()]))
        .importer(Arc::new(RecordingImporter::new([layout], &log)))
        .build();

    let resource = Resource::memory(
        "home",
        r#"<?xml version="1.0"?><p:layout xmlns:p="urn:portal:layout" version="4" name="home"/>"#,
    );
    service(registry).import_resource(&resource).await.unwrap();

    assert_eq!(log.entries(), vec!["layout@4:home"]);
}
