//! # Porter Configuration
//!
//! Settings for batch portal data imports and exports: which files a batch
//! import picks up, whether a batch halts on its first failure, and how the
//! worker pool is sized.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use porter_config::PortalDataConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PortalDataConfig::load_from_file("portal-data.toml").await?;
//!     println!("pool size: {}", config.workers.pool_size);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod loader;

pub use config::*;
