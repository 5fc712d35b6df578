//! Root element inspection.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{PortalDataError, Result};
use crate::key::QualifiedName;

/// Name and attributes of a document's first element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootElement {
    /// Namespace-resolved element name
    pub name: QualifiedName,
    /// Attributes in document order, namespace declarations included
    pub attributes: Vec<(String, String)>,
}

impl RootElement {
    /// Value of an unprefixed attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Build the root description from a start tag.
    ///
    /// The root has no ancestors, so its namespace is resolved from its own
    /// `xmlns`/`xmlns:prefix` declarations.
    pub(crate) fn from_start(start: &BytesStart<'_>, origin: &str) -> Result<Self> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| PortalDataError::decode(origin, e))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| PortalDataError::decode(origin, e))?
                .into_owned();
            attributes.push((key, value));
        }

        let qname = start.name();
        let local_name = String::from_utf8_lossy(qname.local_name().as_ref()).into_owned();
        let declaration = match qname.prefix() {
            Some(prefix) => format!("xmlns:{}", String::from_utf8_lossy(prefix.as_ref())),
            None => "xmlns".to_string(),
        };
        let namespace = attributes
            .iter()
            .find(|(key, _)| *key == declaration)
            .map(|(_, value)| value.clone())
            .filter(|ns| !ns.is_empty());

        Ok(Self {
            name: QualifiedName {
                namespace,
                local_name,
            },
            attributes,
        })
    }
}

/// Read only as far as the first element of `bytes` and describe it.
///
/// Used when classifying files during a scan, where materializing the whole
/// document would be wasted work.
pub fn peek_root_element(bytes: &[u8], origin: &str) -> Result<RootElement> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref start)) | Ok(Event::Empty(ref start)) => {
                return RootElement::from_start(start, origin);
            }
            Ok(Event::Eof) => {
                return Err(PortalDataError::decode(
                    origin,
                    "document has no root element",
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(PortalDataError::decode(origin, e)),
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_default_namespace() {
        let xml = br#"<?xml version="1.0"?>
<!-- exported -->
<user xmlns="urn:portal:user" version="4.0"><name>admin</name></user>"#;

        let root = peek_root_element(xml, "test").unwrap();

        assert_eq!(
            root.name,
            QualifiedName::namespaced("urn:portal:user", "user")
        );
        assert_eq!(root.attribute("version"), Some("4.0"));
    }

    #[test]
    fn resolves_prefixed_namespace() {
        let xml = br#"<p:layout xmlns:p="urn:portal:layout" script="classpath://l.crn"/>"#;

        let root = peek_root_element(xml, "test").unwrap();

        assert_eq!(
            root.name,
            QualifiedName::namespaced("urn:portal:layout", "layout")
        );
        assert_eq!(root.attribute("script"), Some("classpath://l.crn"));
    }

    #[test]
    fn empty_document_is_a_decode_error() {
        let err = peek_root_element(b"<?xml version=\"1.0\"?>", "empty.xml").unwrap_err();
        assert!(matches!(err, PortalDataError::Decode { ref origin, .. } if origin == "empty.xml"));
    }

    #[test]
    fn plain_text_is_a_decode_error() {
        assert!(peek_root_element(b"just some notes", "notes.txt").is_err());
    }
}
