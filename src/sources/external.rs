//! Pluggable external configuration store.

use super::ConfigurationItem;
use crate::error::Result;
use async_trait::async_trait;

/// A host-supplied store backing configuration with something other than the
/// local filesystem, such as a remote key-value service.
///
/// The registry composes this with file content using a newest-timestamp-wins
/// policy: whichever side was updated more recently provides the content that
/// gets parsed. When the file side is strictly newer, its content is pushed
/// back through [`put`](ExternalSource::put) on a background task.
///
/// A failing [`get`](ExternalSource::get) is treated as "no external content"
/// and logged; it never surfaces to registry callers. A failing `put` is
/// logged and not retried — implementations that need retries should perform
/// them internally.
///
/// # Examples
///
/// ```rust,no_run
/// use confreg::prelude::*;
/// use async_trait::async_trait;
///
/// struct KvStore;
///
/// #[async_trait]
/// impl ExternalSource for KvStore {
///     async fn get(&self, name: &str) -> Result<ConfigurationItem> {
///         // fetch from the remote store
///         Ok(ConfigurationItem::empty(name))
///     }
///
///     async fn put(&self, _item: ConfigurationItem) -> Result<()> {
///         // write through to the remote store
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ExternalSource: Send + Sync {
    /// Fetch the externally stored content for a logical name.
    ///
    /// Return [`ConfigurationItem::empty`] when the store has no content for
    /// `name`; an empty item always loses reconciliation against a real file.
    async fn get(&self, name: &str) -> Result<ConfigurationItem>;

    /// Write content to the external store.
    async fn put(&self, item: ConfigurationItem) -> Result<()>;
}
