//! Type keys identify the logical type and format version of a document.
//!
//! A [`TypeKey`] is derived from a document's root element: the element's
//! qualified name plus its optional `script` and `version` attributes. Keys are
//! plain values used as map keys throughout the registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::RootElement;

/// Root attribute naming the script a document was written for.
pub const SCRIPT_ATTRIBUTE: &str = "script";

/// Root attribute naming the format version of a document.
pub const VERSION_ATTRIBUTE: &str = "version";

/// Namespace-qualified XML element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Namespace URI, if the element is in a namespace
    pub namespace: Option<String>,
    /// Local part of the element name
    pub local_name: String,
}

impl QualifiedName {
    /// Name without a namespace.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Name in the given namespace.
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Identifies a document's logical type and format version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    name: QualifiedName,
    script: Option<String>,
    version: Option<String>,
}

impl TypeKey {
    /// Key for a root element name with no script or version.
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            script: None,
            version: None,
        }
    }

    /// Shorthand for a key whose root element has no namespace.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self::new(QualifiedName::local(local_name))
    }

    /// Set the script this key applies to.
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Set the format version this key applies to.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Derive the key for a document from its root element.
    pub fn from_root(root: &RootElement) -> Self {
        Self {
            name: root.name.clone(),
            script: root.attribute(SCRIPT_ATTRIBUTE).map(str::to_string),
            version: root.attribute(VERSION_ATTRIBUTE).map(str::to_string),
        }
    }

    /// Root element name.
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Script attribute, if any.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Version attribute, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match (&self.script, &self.version) {
            (Some(script), Some(version)) => write!(f, " (script={}, version={})", script, version),
            (Some(script), None) => write!(f, " (script={})", script),
            (None, Some(version)) => write!(f, " (version={})", version),
            (None, None) => Ok(()),
        }
    }
}
