//! Serde-based XML codec helpers for handlers.
//!
//! Handlers are free to decode documents however they like; these helpers cover
//! the common case of mapping a whole document onto a serde type.

use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::DocumentCursor;
use crate::error::{PortalDataError, Result};

/// Declaration written at the top of every encoded document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Deserialize the remaining events of `cursor` into `T`.
pub fn decode_xml<T: DeserializeOwned>(cursor: &mut DocumentCursor) -> Result<T> {
    let xml = cursor.read_to_string()?;
    quick_xml::de::from_str(&xml).map_err(|e| PortalDataError::decode(cursor.origin(), e))
}

/// Serialize `value` as a document with the given root element name.
pub fn encode_xml<T: Serialize>(value: &T, root: &str, sink: &mut dyn Write) -> Result<()> {
    let body = quick_xml::se::to_string_with_root(root, value)
        .map_err(|e| PortalDataError::encode(root, e))?;
    writeln!(sink, "{}", XML_DECLARATION)
        .and_then(|_| sink.write_all(body.as_bytes()))
        .map_err(|e| PortalDataError::io(format!("writing {}", root), e))
}
