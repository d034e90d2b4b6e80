//! Builder for constructing ConfigRegistry instances.

use crate::core::loader::ConfigLoader;
use crate::core::registry::{ConfigRegistry, RegistryInner};
use crate::core::resolver::{PathResolver, SEARCH_PATH_CONFIG, SearchPaths, default_base_dir};
use crate::sources::ExternalSource;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "file-watch")]
use crate::core::registry::spawn_invalidation_task;
#[cfg(feature = "file-watch")]
use crate::notify::WatchManager;

/// Builder for constructing a [`ConfigRegistry`].
///
/// Building is infallible: every failure mode of this subsystem degrades to
/// defaults plus a log line, so `build()` returns the registry directly.
///
/// # Examples
///
/// ```rust,no_run
/// use confreg::prelude::*;
///
/// # async fn example() {
/// let registry = ConfigRegistry::builder()
///     .with_search_path("/etc/myapp")
///     .with_search_path("config")
///     .with_dev_mode(true)
///     .build()
///     .await;
/// # }
/// ```
pub struct ConfigRegistryBuilder {
    search_paths: Vec<PathBuf>,
    dev_mode: bool,
    external: Option<Arc<dyn ExternalSource>>,
    #[cfg(feature = "file-watch")]
    file_watch: bool,
    #[cfg(feature = "file-watch")]
    watch_queue_capacity: usize,
}

impl ConfigRegistryBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            dev_mode: false,
            external: None,
            #[cfg(feature = "file-watch")]
            file_watch: true,
            #[cfg(feature = "file-watch")]
            watch_queue_capacity: 256,
        }
    }

    /// Add a directory to the fallback search path.
    ///
    /// The fallback applies until (and whenever) the `SearchPath.conf`
    /// configuration provides a non-empty directory list of its own. With no
    /// directories added, the fallback is the process base install directory
    /// (the executable directory with trailing `bin`/`debug`/`release`
    /// segments stripped).
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    /// Prefer `Name.dev.conf` variants during path resolution.
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Back configurations with an external store in addition to the
    /// filesystem.
    ///
    /// File and external content are reconciled newest-timestamp-wins; see
    /// [`ExternalSource`].
    pub fn with_external_source(mut self, source: Arc<dyn ExternalSource>) -> Self {
        self.external = Some(source);
        self
    }

    /// Enable or disable filesystem watching (enabled by default).
    ///
    /// With watching disabled, entries only invalidate through
    /// [`remove_config`](ConfigRegistry::remove_config) or forced reloads.
    #[cfg(feature = "file-watch")]
    pub fn with_file_watch(mut self, enabled: bool) -> Self {
        self.file_watch = enabled;
        self
    }

    /// Capacity of the bounded watch-event queue (default 256).
    ///
    /// A full queue blocks the watch backend's delivery thread until the
    /// invalidation task catches up; events are never dropped.
    #[cfg(feature = "file-watch")]
    pub fn with_watch_queue_capacity(mut self, capacity: usize) -> Self {
        self.watch_queue_capacity = capacity.max(1);
        self
    }

    /// Build the registry.
    ///
    /// Loads the search-path configuration (defaulting it if the backing
    /// file does not exist) and, when watching is enabled, sets up one watch
    /// handle per existing search directory and starts the invalidation
    /// task.
    pub async fn build(self) -> ConfigRegistry {
        let fallback = if self.search_paths.is_empty() {
            vec![default_base_dir()]
        } else {
            self.search_paths
        };
        let resolver = Arc::new(PathResolver::new(self.dev_mode, fallback));
        let loader = ConfigLoader::new(Arc::clone(&resolver), self.external);

        #[cfg(feature = "file-watch")]
        let (watcher, watch_rx) = if self.file_watch {
            let (watcher, rx) = WatchManager::enabled(self.watch_queue_capacity);
            (watcher, Some(rx))
        } else {
            (WatchManager::disabled(), None)
        };

        let inner = Arc::new(RegistryInner::new(
            resolver,
            loader,
            #[cfg(feature = "file-watch")]
            watcher,
        ));

        // The search-path entry is always present, defaulted when its file is
        // missing, and cached like any other configuration.
        inner
            .add_config::<SearchPaths>(SEARCH_PATH_CONFIG, None, false)
            .await;

        #[cfg(feature = "file-watch")]
        if let Some(rx) = watch_rx {
            spawn_invalidation_task(Arc::clone(&inner), rx);
            inner.rebuild_watches().await;
        }

        ConfigRegistry::from_inner(inner)
    }
}

impl Default for ConfigRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_search_paths() {
        let builder = ConfigRegistryBuilder::new()
            .with_search_path("/etc/app")
            .with_search_path("config");
        assert_eq!(builder.search_paths.len(), 2);
    }

    #[test]
    fn test_builder_defaults() {
        let builder = ConfigRegistryBuilder::new();
        assert!(!builder.dev_mode);
        assert!(builder.external.is_none());
        #[cfg(feature = "file-watch")]
        assert!(builder.file_watch);
    }

    #[cfg(feature = "file-watch")]
    #[test]
    fn test_queue_capacity_has_a_floor() {
        let builder = ConfigRegistryBuilder::new().with_watch_queue_capacity(0);
        assert_eq!(builder.watch_queue_capacity, 1);
    }

    #[tokio::test]
    async fn test_build_seeds_search_path_entry() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let registry = ConfigRegistryBuilder::new()
            .with_search_path(temp_dir.path())
            .build()
            .await;

        // The reserved entry exists even with no backing file.
        assert!(registry.get_entry(SEARCH_PATH_CONFIG).is_some());
        let paths = registry.get_config::<SearchPaths>(SEARCH_PATH_CONFIG);
        assert!(paths.0.is_empty());
    }
}
