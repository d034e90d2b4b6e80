//! The process-wide configuration registry.

use crate::core::loader::ConfigLoader;
use crate::core::resolver::{PathResolver, SEARCH_PATH_CONFIG, SearchPaths};
use crate::core::store::{ConfigEntry, ConfigStore};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

#[cfg(feature = "file-watch")]
use crate::core::resolver::is_config_file;
#[cfg(feature = "file-watch")]
use tracing::debug;
#[cfg(feature = "file-watch")]
use crate::notify::WatchManager;
#[cfg(feature = "file-watch")]
use tokio::sync::mpsc;

/// The registry: a concurrent cache of named, typed configurations.
///
/// Configurations are loaded lazily from `<name>.conf` JSON files found under
/// an ordered list of search directories, cached until a filesystem change
/// (or an explicit removal) invalidates them, and served to any number of
/// concurrent readers without blocking on IO. No operation here ever fails:
/// a missing, unreadable, or malformed configuration reads as the type's
/// default value, visible only in logs.
///
/// The registry is an explicit context object with a controlled lifecycle:
/// build it once, clone the handle freely (clones share all state), and call
/// [`shutdown`](ConfigRegistry::shutdown) to release watch handles.
///
/// # Examples
///
/// ```rust,no_run
/// use confreg::prelude::*;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// #[serde(default)]
/// struct ServerConfig {
///     port: u16,
///     host: String,
/// }
///
/// # async fn example() {
/// let registry = ConfigRegistry::builder()
///     .with_search_path("config")
///     .build()
///     .await;
///
/// // Loads config/Server.conf on first access, cached afterwards.
/// let server = registry.get_create_config::<ServerConfig>("Server", None, false).await;
/// println!("listening on {}:{}", server.host, server.port);
/// # }
/// ```
pub struct ConfigRegistry {
    inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    store: ConfigStore,
    resolver: Arc<PathResolver>,
    loader: ConfigLoader,
    #[cfg(feature = "file-watch")]
    watcher: WatchManager,
}

impl ConfigRegistry {
    /// Create a new builder for constructing a registry.
    pub fn builder() -> crate::core::ConfigRegistryBuilder {
        crate::core::ConfigRegistryBuilder::new()
    }

    pub(crate) fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    /// Ensure an entry exists for `name`, loading it if needed.
    ///
    /// With `force_update` false this is load-once: an existing entry is left
    /// untouched with no reload and no error. With `force_update` true the
    /// entry is always recomputed and replaced. Concurrent calls for the same
    /// absent name may each load; they read the same file, and the last
    /// writer into the cache wins.
    ///
    /// `path` overrides the conventional `<name>.conf` logical path; relative
    /// paths still go through search-directory resolution.
    pub async fn add_config<T>(&self, name: &str, path: Option<&Path>, force_update: bool)
    where
        T: DeserializeOwned + Default + Send + Sync + 'static,
    {
        self.inner.add_config::<T>(name, path, force_update).await;
    }

    /// The cached value for `name`, or a fresh default when absent.
    ///
    /// Never blocks on IO and never fails. A cached entry of a different type
    /// than `T` also reads as the default (and is logged).
    pub fn get_config<T>(&self, name: &str) -> Arc<T>
    where
        T: Default + Send + Sync + 'static,
    {
        match self.inner.store.get(name) {
            Some(entry) => match entry.value::<T>() {
                Some(value) => value,
                None => {
                    warn!(
                        name,
                        requested = std::any::type_name::<T>(),
                        "cached configuration has a different type; returning defaults"
                    );
                    Arc::new(T::default())
                }
            },
            None => Arc::new(T::default()),
        }
    }

    /// Ensure an entry exists for `name`, then return its value.
    ///
    /// The primary caller-facing entry point: [`add_config`] followed by
    /// [`get_config`].
    ///
    /// [`add_config`]: ConfigRegistry::add_config
    /// [`get_config`]: ConfigRegistry::get_config
    pub async fn get_create_config<T>(
        &self,
        name: &str,
        path: Option<&Path>,
        force_update: bool,
    ) -> Arc<T>
    where
        T: DeserializeOwned + Default + Send + Sync + 'static,
    {
        self.add_config::<T>(name, path, force_update).await;
        self.get_config::<T>(name)
    }

    /// Evict the entry for `name`; the next access reloads it from source.
    ///
    /// The name is normalized first (directory components and `.conf`/`.dev`
    /// suffixes stripped), so a file path works as well as a logical name.
    /// Removing the search-path entry rebuilds all directory watches, since
    /// the set of directories to watch may itself have changed.
    pub async fn remove_config(&self, name: &str) {
        let normalized = self.inner.resolver.normalize_name(name);
        self.inner.store.remove(&normalized);

        #[cfg(feature = "file-watch")]
        if normalized == SEARCH_PATH_CONFIG {
            self.inner.rebuild_watches().await;
        }
    }

    /// The cached entry for `name`, with provenance metadata.
    pub fn get_entry(&self, name: &str) -> Option<Arc<ConfigEntry>> {
        self.inner.store.get(name)
    }

    /// Whether development-mode resolution is active.
    pub fn dev_mode(&self) -> bool {
        self.inner.resolver.dev_mode()
    }

    /// Whether any directory watches are currently active.
    #[cfg(feature = "file-watch")]
    pub fn is_watching(&self) -> bool {
        self.inner.watcher.is_running()
    }

    /// Release all watch handles and stop the invalidation task.
    ///
    /// Cached entries stay readable; they just no longer invalidate on
    /// filesystem changes.
    pub async fn shutdown(&self) {
        #[cfg(feature = "file-watch")]
        self.inner.watcher.shutdown().await;
    }
}

impl Clone for ConfigRegistry {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigRegistry")
            .field("entries", &self.inner.store.len())
            .field("dev_mode", &self.inner.resolver.dev_mode())
            .finish_non_exhaustive()
    }
}

impl RegistryInner {
    pub(crate) fn new(
        resolver: Arc<PathResolver>,
        loader: ConfigLoader,
        #[cfg(feature = "file-watch")] watcher: WatchManager,
    ) -> Self {
        Self {
            store: ConfigStore::new(),
            resolver,
            loader,
            #[cfg(feature = "file-watch")]
            watcher,
        }
    }

    pub(crate) async fn add_config<T>(&self, name: &str, path: Option<&Path>, force_update: bool)
    where
        T: DeserializeOwned + Default + Send + Sync + 'static,
    {
        self.store
            .upsert(name, force_update, || self.loader.load::<T>(name, path))
            .await;

        // A (re)loaded search-path entry also refreshes the resolver snapshot.
        if name == SEARCH_PATH_CONFIG {
            self.sync_search_dirs();
        }
    }

    fn sync_search_dirs(&self) {
        if let Some(entry) = self.store.get(SEARCH_PATH_CONFIG) {
            if let Some(paths) = entry.value::<SearchPaths>() {
                self.resolver.set_search_paths(&paths);
            }
        }
    }

    /// Force-reload the search-path entry, then tear down and rebuild every
    /// directory watch against the refreshed directory list.
    #[cfg(feature = "file-watch")]
    pub(crate) async fn rebuild_watches(&self) {
        if !self.watcher.is_enabled() {
            return;
        }
        self.add_config::<SearchPaths>(SEARCH_PATH_CONFIG, None, true)
            .await;
        self.watcher.rebuild(&self.resolver).await;
    }

    #[cfg(feature = "file-watch")]
    async fn handle_watch_event(&self, event: notify::Event) {
        let mut rebuild = false;
        for path in &event.paths {
            if !is_config_file(path) {
                continue;
            }
            let name = self.resolver.normalize_name(&path.to_string_lossy());
            debug!(name, kind = ?event.kind, "filesystem event invalidates configuration");
            self.store.remove(&name);
            if name == SEARCH_PATH_CONFIG {
                rebuild = true;
            }
        }
        // The set of directories to watch may itself have changed.
        if rebuild {
            self.rebuild_watches().await;
        }
    }
}

/// Consume watch events until every sender is gone.
///
/// Each event evicts the affected entries; the task exits when the watch
/// manager shuts down and the channel closes.
#[cfg(feature = "file-watch")]
pub(crate) fn spawn_invalidation_task(
    inner: Arc<RegistryInner>,
    mut rx: mpsc::Receiver<notify::Event>,
) {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            inner.handle_watch_event(event).await;
        }
        debug!("watch event channel closed; invalidation task exiting");
    });
}
