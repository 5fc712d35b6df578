//! Fully materialized XML documents.

use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use super::cursor::DocumentCursor;
use super::root::RootElement;
use crate::error::{PortalDataError, Result};

/// An XML document decoded once into owned events.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    origin: String,
    events: Vec<Event<'static>>,
}

impl XmlDocument {
    /// Decode a complete document.
    ///
    /// # Errors
    ///
    /// Returns [`PortalDataError::Decode`] if the bytes are not well-formed XML.
    pub fn parse(bytes: &[u8], origin: impl Into<String>) -> Result<Self> {
        let origin = origin.into();
        let events = read_events(bytes, &origin)?;
        Ok(Self { origin, events })
    }

    /// Decode a complete document held in a string.
    pub fn parse_str(xml: &str, origin: impl Into<String>) -> Result<Self> {
        Self::parse(xml.as_bytes(), origin)
    }

    pub(crate) fn from_events(events: Vec<Event<'static>>, origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            events,
        }
    }

    /// Description of where the document came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Every event of the document, without the trailing EOF.
    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    /// Number of events in the document.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when the document has no events at all.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Describe the document's first element.
    pub fn root(&self) -> Result<RootElement> {
        self.events
            .iter()
            .find_map(|event| match event {
                Event::Start(start) | Event::Empty(start) => Some(start),
                _ => None,
            })
            .ok_or_else(|| PortalDataError::decode(self.origin.clone(), "document has no root element"))
            .and_then(|start| RootElement::from_start(start, &self.origin))
    }

    /// Serialize the whole document back to text.
    pub fn to_xml_string(&self) -> Result<String> {
        write_events(&self.events, &self.origin)
    }

    /// Wrap the document for sharing and open a cursor over it.
    pub fn into_cursor(self) -> DocumentCursor {
        DocumentCursor::new(Arc::new(self))
    }
}

pub(crate) fn read_events(bytes: &[u8], origin: &str) -> Result<Vec<Event<'static>>> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut events = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(event) => events.push(event.into_owned()),
            Err(e) => return Err(PortalDataError::decode(origin, e)),
        }
        buf.clear();
    }
    Ok(events)
}

pub(crate) fn write_events(events: &[Event<'static>], origin: &str) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    for event in events {
        writer
            .write_event(event.borrow())
            .map_err(|e| PortalDataError::decode(origin, e))?;
    }
    String::from_utf8(writer.into_inner()).map_err(|e| PortalDataError::decode(origin, e))
}
