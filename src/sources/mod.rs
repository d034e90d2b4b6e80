//! Configuration content sources.
//!
//! Both the local filesystem and an optional external store produce raw
//! content as a [`ConfigurationItem`]; the loader reconciles the two by
//! comparing timestamps.

mod external;
mod file;

pub use external::ExternalSource;
pub use file::FileSource;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of raw configuration content together with its provenance.
///
/// The loader compares the `last_updated` timestamps of the file-derived item
/// and the external-store item; the strictly newer one wins as the
/// authoritative content for parsing. On a tie the file wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationItem {
    /// Logical configuration name this content belongs to.
    pub name: String,
    /// Raw UTF-8 content. Empty means "no content; use defaults".
    pub data: String,
    /// When the content was last modified at its source.
    pub last_updated: DateTime<Utc>,
    /// Whether this item came from the external store rather than a file.
    pub from_external: bool,
}

impl ConfigurationItem {
    /// An empty item for `name`, timestamped at the epoch.
    ///
    /// Used wherever a source has nothing to offer: a missing file, an
    /// unconfigured delegate, or a delegate that failed. An empty item always
    /// loses timestamp reconciliation against real content.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: String::new(),
            last_updated: DateTime::UNIX_EPOCH,
            from_external: false,
        }
    }

    /// Whether this item carries any content.
    pub fn has_content(&self) -> bool {
        !self.data.is_empty()
    }
}
