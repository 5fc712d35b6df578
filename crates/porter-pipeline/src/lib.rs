//! Batch Orchestration Layer
//!
//! This crate imports, upgrades and exports portal data by driving the
//! handlers registered for each data type.
//!
//! ## Architecture
//!
//! Leaves first:
//!
//! 1. **Registry**: maps type keys to handlers and fixes the global import order
//! 2. **Import Pipeline**: loads a document, keys it, expands the key through its
//!    data type and dispatches each target
//! 3. **Dispatcher**: imports a document, or upgrades it and feeds the result
//!    back into the pipeline
//! 4. **Batch Tracker**: fail-fast bookkeeping of the concurrent tasks of a batch
//! 5. **Orchestrators**: batch import by key and batch export by type, with a
//!    barrier between groups
//!
//! ## Clear Separation of Concerns
//!
//! Infrastructure crates (DO NOT orchestrate):
//! - `porter-core`: documents, keys and handler contracts
//! - `porter-scan`: finds and keys files
//! - `porter-config`: settings
//!
//! This crate (porter-pipeline):
//! - Decides what runs, in which order, and how failures end a batch
//! - Provides the single interface callers use ([`PortalDataService`])
//!
//! ## Usage
//!
//! ```rust,ignore
//! use porter_pipeline::{PortalDataRegistry, PortalDataService};
//!
//! let registry = PortalDataRegistry::builder()
//!     .data_type(users)
//!     .importer(user_importer)
//!     .exporter(user_exporter)
//!     .build();
//! let service = PortalDataService::new(Arc::new(registry), config);
//!
//! let report = service.import_batch(Path::new("data"), None, None).await?;
//! ```

pub mod batch_import;
pub mod dispatch;
pub mod export;
pub mod import;
pub mod pool;
pub mod registry;
pub mod service;
pub mod tracker;

pub use batch_import::{BatchImportOptions, BatchImporter, ImportReport};
pub use export::{BatchExportOptions, ExportOrchestrator};
pub use import::ImportPipeline;
pub use pool::WorkerPool;
pub use registry::{PortalDataRegistry, RegistryBuilder};
pub use service::PortalDataService;
pub use tracker::{BatchTracker, TaskHandle, TaskKind, TrackerPhase, WaitMode};
