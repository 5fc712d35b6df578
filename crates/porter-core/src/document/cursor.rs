//! Restartable cursor over a materialized document.

use std::sync::Arc;

use quick_xml::events::Event;

use super::root::RootElement;
use super::xml::{write_events, XmlDocument};
use crate::error::Result;

/// Forward-only reader over an [`XmlDocument`] that can be rewound.
///
/// Cloning a cursor is cheap (the document is shared), but each task owns its
/// own cursor; cursors are never shared across tasks.
#[derive(Debug, Clone)]
pub struct DocumentCursor {
    document: Arc<XmlDocument>,
    position: usize,
}

impl DocumentCursor {
    /// Cursor positioned at the start of `document`.
    pub fn new(document: Arc<XmlDocument>) -> Self {
        Self {
            document,
            position: 0,
        }
    }

    /// Description of the underlying document.
    pub fn origin(&self) -> &str {
        self.document.origin()
    }

    /// Describe the root element without moving the cursor.
    pub fn peek_root(&self) -> Result<RootElement> {
        self.document.root()
    }

    /// Rewind to the first event.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Index of the next event to be returned.
    pub fn position(&self) -> usize {
        self.position
    }

    /// True once every event has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.document.len()
    }

    /// Next event without consuming it.
    pub fn peek_event(&self) -> Option<&Event<'static>> {
        self.document.events().get(self.position)
    }

    /// Consume and return the next event.
    pub fn next_event(&mut self) -> Option<&Event<'static>> {
        let index = self.position;
        if index >= self.document.len() {
            return None;
        }
        self.position += 1;
        self.document.events().get(index)
    }

    /// Events not yet consumed.
    pub fn remaining(&self) -> &[Event<'static>] {
        let start = self.position.min(self.document.len());
        &self.document.events()[start..]
    }

    /// Serialize every remaining event and move to the end.
    pub fn read_to_string(&mut self) -> Result<String> {
        let xml = write_events(self.remaining(), self.document.origin())?;
        self.position = self.document.len();
        Ok(xml)
    }
}
