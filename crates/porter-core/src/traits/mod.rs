//! Handler contracts for pluggable portal data types
//!
//! Each kind of data plugs into the engine through a small set of traits:
//!
//! - [`PortalDataType`]: a named category of data and the keys it accepts
//! - [`DataImporter`]: decodes and imports documents of some keys
//! - [`DataUpgrader`]: rewrites documents of old keys into newer formats
//! - [`DataExporter`]: lists and encodes records of a type
//! - [`DataDeleter`]: removes records of a type
//!
//! ## Typed and Erased Traits
//!
//! Importers, exporters and deleters are written against an associated `Data`
//! type. The registry stores them as trait objects, so each typed trait has an
//! erased counterpart ([`ImportHandler`], [`ExportHandler`], [`DeleteHandler`])
//! implemented for every typed handler by a blanket impl:
//!
//! ```text
//! ┌───────────────────┐  blanket impl   ┌──────────────────────┐
//! │ DataImporter      │ ──────────────▶ │ ImportHandler        │ ← Arc<dyn _> in registry
//! │   type Data       │                 │   decode_and_import  │
//! └───────────────────┘                 └──────────────────────┘
//! ```
//!
//! Typed handlers report failures with `anyhow`; the erased layer wraps them in
//! [`PortalDataError`](crate::PortalDataError) variants carrying the document or
//! record they concern.

pub mod data_type;
pub mod deleter;
pub mod exporter;
pub mod importer;
pub mod upgrader;

pub use data_type::{BasicDataType, PortalDataType};
pub use deleter::{DataDeleter, DeleteHandler};
pub use exporter::{DataExporter, ExportHandler};
pub use importer::{DataImporter, ImportHandler};
pub use upgrader::{DataUpgrader, UpgradeOutcome};
