//! In-memory XML documents and the restartable cursor used to read them.
//!
//! A document is decoded exactly once into a list of owned `quick_xml` events.
//! Every pass over it (peeking the root element, post-processing keys, decoding,
//! upgrading) goes through a [`DocumentCursor`] that can be rewound to the first
//! event any number of times without touching the original bytes again.
//!
//! ```text
//! bytes ──parse──▶ XmlDocument (Arc) ──cursor()──▶ DocumentCursor ──reset()──┐
//!                                                        ▲                    │
//!                                                        └────────────────────┘
//! ```

mod cursor;
mod root;
mod sink;
mod xml;

pub use cursor::DocumentCursor;
pub use root::{peek_root_element, RootElement};
pub use sink::DocumentSink;
pub use xml::XmlDocument;
