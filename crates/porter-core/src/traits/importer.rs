//! Importers decode documents into domain objects and persist them.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::document::DocumentCursor;
use crate::error::{PortalDataError, Result};
use crate::key::TypeKey;

/// Typed importer for one or more document keys.
///
/// # Examples
///
/// ```rust,ignore
/// struct UserImporter { store: Arc<UserStore> }
///
/// #[async_trait]
/// impl DataImporter for UserImporter {
///     type Data = User;
///
///     fn import_keys(&self) -> HashSet<TypeKey> {
///         HashSet::from([TypeKey::local("user").with_version("4.0")])
///     }
///
///     fn decode(&self, cursor: &mut DocumentCursor) -> anyhow::Result<User> {
///         Ok(codec::decode_xml(cursor)?)
///     }
///
///     async fn import_data(&self, user: User) -> anyhow::Result<()> {
///         self.store.save(user).await
///     }
/// }
/// ```
#[async_trait]
pub trait DataImporter: Send + Sync + 'static {
    /// Decoded form of an imported document
    type Data: Send + 'static;

    /// Keys this importer accepts
    fn import_keys(&self) -> HashSet<TypeKey>;

    /// Decode the document under `cursor`, which is positioned at its start
    fn decode(&self, cursor: &mut DocumentCursor) -> anyhow::Result<Self::Data>;

    /// Persist a decoded object
    async fn import_data(&self, data: Self::Data) -> anyhow::Result<()>;

    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Object-safe importer stored by the registry.
#[async_trait]
pub trait ImportHandler: Send + Sync {
    /// Keys this handler accepts
    fn supported_keys(&self) -> HashSet<TypeKey>;

    /// Name used in logs
    fn handler_name(&self) -> &'static str;

    /// Decode the document under `cursor` and import the result
    async fn decode_and_import(&self, cursor: &mut DocumentCursor) -> Result<()>;
}

#[async_trait]
impl<T: DataImporter> ImportHandler for T {
    fn supported_keys(&self) -> HashSet<TypeKey> {
        self.import_keys()
    }

    fn handler_name(&self) -> &'static str {
        self.name()
    }

    async fn decode_and_import(&self, cursor: &mut DocumentCursor) -> Result<()> {
        let origin = cursor.origin().to_string();
        let data = self
            .decode(cursor)
            .map_err(|e| PortalDataError::decode(origin.clone(), e))?;
        self.import_data(data)
            .await
            .map_err(|e| PortalDataError::handler(format!("importing {}", origin), e))
    }
}
