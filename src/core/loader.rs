//! Loads raw configuration content and parses it into typed entries.

use crate::core::resolver::{CONF_EXTENSION, PathResolver};
use crate::core::store::ConfigEntry;
use crate::sources::{ConfigurationItem, ExternalSource, FileSource};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Produces [`ConfigEntry`] values by reading the filesystem and, when
/// configured, an external store.
///
/// The two sources are reconciled by timestamp: strictly newer content wins,
/// and on a tie (or when both sides are empty) the file side wins as the
/// default source of truth. Loading never fails — every error degrades to a
/// default-constructed value and a log line.
pub(crate) struct ConfigLoader {
    resolver: Arc<PathResolver>,
    external: Option<Arc<dyn ExternalSource>>,
}

impl ConfigLoader {
    pub(crate) fn new(
        resolver: Arc<PathResolver>,
        external: Option<Arc<dyn ExternalSource>>,
    ) -> Self {
        Self { resolver, external }
    }

    /// Load the configuration for `name` into an entry holding a `T`.
    ///
    /// `explicit_path` overrides the conventional `<name>.conf` logical path;
    /// either way the path goes through search-directory resolution.
    pub(crate) async fn load<T>(&self, name: &str, explicit_path: Option<&Path>) -> ConfigEntry
    where
        T: DeserializeOwned + Default + Send + Sync + 'static,
    {
        let logical = explicit_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(format!("{name}.{CONF_EXTENSION}")));
        let resolved = self.resolver.resolve(&logical);

        let file_item = FileSource::new(&resolved).read(name);
        let external_item = self.fetch_external(name).await;

        // Strictly newer external content wins; ties favor the file.
        let file_is_newer = file_item.last_updated > external_item.last_updated;
        let winner = if external_item.last_updated > file_item.last_updated {
            debug!(name, "external content is newer than file content");
            external_item
        } else {
            if file_is_newer && file_item.has_content() {
                self.propagate_to_external(&file_item);
            }
            file_item
        };

        let value: T = parse(name, &winner.data);
        ConfigEntry::new(name, value, winner.data, resolved, winner.last_updated)
    }

    async fn fetch_external(&self, name: &str) -> ConfigurationItem {
        let Some(source) = &self.external else {
            return ConfigurationItem::empty(name);
        };
        match source.get(name).await {
            Ok(item) => item,
            Err(err) => {
                warn!(name, error = %err, "external source lookup failed; using empty content");
                ConfigurationItem::empty(name)
            }
        }
    }

    /// Push newer file content to the external store on a background task.
    ///
    /// Fire-and-forget: the task logs its own failure and is never retried.
    fn propagate_to_external(&self, item: &ConfigurationItem) {
        let Some(source) = &self.external else {
            return;
        };
        let source = Arc::clone(source);
        let item = item.clone();
        tokio::spawn(async move {
            let name = item.name.clone();
            if let Err(err) = source.put(item).await {
                error!(name, error = %err, "failed to propagate configuration to external store");
            }
        });
    }
}

/// Parse raw text into a `T`, degrading to `T::default()` on any failure.
///
/// Empty content is the normal missing-file case and parses to defaults
/// without an attempt; literal `null` content is logged separately from
/// malformed content so the two failure modes are distinguishable in logs.
fn parse<T>(name: &str, raw: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        debug!(name, "no configuration content; using defaults");
        return T::default();
    }
    if trimmed == "null" {
        error!(name, "null configuration content; using defaults");
        return T::default();
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(err) => {
            error!(name, error = %err, content = raw, "failed to parse configuration; using defaults");
            T::default()
        }
    }
}
