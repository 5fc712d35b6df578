//! Data type descriptors.

use std::collections::HashSet;
use std::fmt;

use crate::document::DocumentCursor;
use crate::key::TypeKey;
use crate::resource::Resource;

/// A named category of portal data.
///
/// A data type owns the ordered list of keys it accepts during import. The
/// registry flattens these lists, in registration order, into the global import
/// order that batch imports follow.
pub trait PortalDataType: Send + Sync + fmt::Debug {
    /// Stable identifier, used for export directories and file suffixes
    fn type_id(&self) -> &str;

    /// Display title
    fn title(&self) -> &str {
        self.type_id()
    }

    /// Longer description
    fn description(&self) -> &str {
        ""
    }

    /// Keys accepted by this type, in the order their documents must be imported
    fn data_key_import_order(&self) -> Vec<TypeKey>;

    /// Re-derive the keys a document should be imported as.
    ///
    /// Called after the key has been resolved from the root element. An
    /// implementation may inspect the document through `cursor` and return
    /// several keys when one file carries more than one logical import. The
    /// caller rewinds the cursor afterwards.
    fn post_process_key(
        &self,
        resource: &Resource,
        key: &TypeKey,
        cursor: &mut DocumentCursor,
    ) -> anyhow::Result<HashSet<TypeKey>> {
        let _ = (resource, cursor);
        Ok(HashSet::from([key.clone()]))
    }
}

/// Data type defined by plain values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicDataType {
    type_id: String,
    title: Option<String>,
    description: String,
    keys: Vec<TypeKey>,
}

impl BasicDataType {
    pub fn new(type_id: impl Into<String>, keys: Vec<TypeKey>) -> Self {
        Self {
            type_id: type_id.into(),
            title: None,
            description: String::new(),
            keys,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl PortalDataType for BasicDataType {
    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.type_id)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn data_key_import_order(&self) -> Vec<TypeKey> {
        self.keys.clone()
    }
}
