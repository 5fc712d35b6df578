//! Writable document target handed to upgraders.

use quick_xml::events::Event;

use super::cursor::DocumentCursor;
use super::xml::{read_events, XmlDocument};
use crate::error::Result;

/// Collects the events of a document being written.
///
/// Converting a sink into an [`XmlDocument`] keeps the events as they are, so an
/// upgraded document can be re-imported without serializing it first.
#[derive(Debug, Default)]
pub struct DocumentSink {
    events: Vec<Event<'static>>,
}

impl DocumentSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single event.
    pub fn write_event(&mut self, event: Event<'_>) {
        self.events.push(event.into_owned());
    }

    /// Parse an XML fragment and append its events.
    pub fn write_xml(&mut self, xml: &str) -> Result<()> {
        let events = read_events(xml.as_bytes(), "upgrade output")?;
        self.events.extend(events);
        Ok(())
    }

    /// Copy every remaining event of `cursor` into the sink.
    pub fn copy_from(&mut self, cursor: &mut DocumentCursor) {
        while let Some(event) = cursor.next_event() {
            self.events.push(event.clone());
        }
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events written so far.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Turn the written events into a document.
    pub fn into_document(self, origin: impl Into<String>) -> XmlDocument {
        XmlDocument::from_events(self.events, origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::{BytesEnd, BytesStart, BytesText};

    #[test]
    fn written_events_become_a_document() {
        let mut sink = DocumentSink::new();
        let mut start = BytesStart::new("user");
        start.push_attribute(("version", "4.0"));
        sink.write_event(Event::Start(start));
        sink.write_event(Event::Text(BytesText::new("admin")));
        sink.write_event(Event::End(BytesEnd::new("user")));

        let doc = sink.into_document("upgraded");

        assert_eq!(doc.origin(), "upgraded");
        assert_eq!(doc.to_xml_string().unwrap(), r#"<user version="4.0">admin</user>"#);
        assert_eq!(doc.root().unwrap().attribute("version"), Some("4.0"));
    }

    #[test]
    fn copy_from_takes_remaining_events() {
        let mut cursor = XmlDocument::parse_str("<a><b/></a>", "src")
            .unwrap()
            .into_cursor();
        cursor.next_event();

        let mut sink = DocumentSink::new();
        sink.copy_from(&mut cursor);

        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn write_xml_appends_fragments() {
        let mut sink = DocumentSink::new();
        sink.write_xml(r#"<group name="staff"/>"#).unwrap();

        assert!(!sink.is_empty());
        let root = sink.into_document("x").root().unwrap();
        assert_eq!(root.attribute("name"), Some("staff"));
    }
}
