//! Core types for batch portal data import, upgrade and export
//!
//! This crate holds everything the orchestration layer (`porter-pipeline`) and
//! the handlers it drives have in common:
//!
//! - [`TypeKey`]: identifies a document's type and format version
//! - [`document`]: materialized XML documents, restartable cursors, upgrade sinks
//! - [`Resource`]: file or in-memory document sources
//! - [`traits`]: data type, importer, upgrader, exporter and deleter contracts
//! - [`codec`]: serde helpers for mapping whole documents onto structs
//! - [`PortalDataError`]: the error type shared by every crate in the workspace
//!
//! ## Usage
//!
//! ```rust,ignore
//! use porter_core::{Resource, TypeKey};
//!
//! let resource = Resource::file("data/users/admin.user.xml");
//! let root = resource.peek_root().await?;
//! let key = TypeKey::from_root(&root);
//! ```

pub mod codec;
pub mod data;
pub mod document;
pub mod error;
pub mod key;
pub mod resource;
pub mod traits;

pub use data::DataRecord;
pub use document::{DocumentCursor, DocumentSink, RootElement, XmlDocument};
pub use error::{BatchFailure, BoxError, PortalDataError, Result};
pub use key::{QualifiedName, TypeKey};
pub use resource::Resource;
pub use traits::{
    BasicDataType, DataDeleter, DataExporter, DataImporter, DataUpgrader, DeleteHandler,
    ExportHandler, ImportHandler, PortalDataType, UpgradeOutcome,
};
