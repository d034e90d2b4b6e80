//! File-backed configuration content.

use super::ConfigurationItem;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads raw configuration content from a single file.
///
/// A missing file is not an error: it yields an empty item, which downstream
/// parsing turns into a default-constructed value. Other IO failures
/// (permissions, device errors) are logged and likewise yield an empty item.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a file source for the given resolved path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this source reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file into a [`ConfigurationItem`] for `name`.
    ///
    /// The item's timestamp is the file's modification time; an item produced
    /// from a missing or unreadable file is timestamped at the epoch so it
    /// loses reconciliation against any real content.
    pub fn read(&self, name: &str) -> ConfigurationItem {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(name, path = %self.path.display(), "configuration file not found; using empty content");
                return ConfigurationItem::empty(name);
            }
            Err(err) => {
                warn!(name, path = %self.path.display(), error = %err, "failed to read configuration file; using empty content");
                return ConfigurationItem::empty(name);
            }
        };

        let last_updated = fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|err| {
                warn!(name, path = %self.path.display(), error = %err, "failed to read file modification time");
                Utc::now()
            });

        ConfigurationItem {
            name: name.to_string(),
            data,
            last_updated,
            from_external: false,
        }
    }
}
