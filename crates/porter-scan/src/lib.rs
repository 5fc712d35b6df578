//! Directory scanning for batch imports
//!
//! Walks a directory tree, keeps the files accepted by a [`FileFilter`] and
//! keys each one by peeking its root element. Keying reads only as far as the
//! first element of each file; the batch importer loads whole documents later,
//! one task per file.

pub mod error;
pub mod filter;
pub mod scanner;

pub use error::{Result, ScanError};
pub use filter::FileFilter;
pub use scanner::{DirectoryScanner, GlobDirectoryScanner, ScannedResource};
