//! Concurrent cache of parsed configuration entries.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A cached, parsed configuration together with its provenance.
///
/// Entries are immutable once constructed and replaced wholesale on every
/// reload, so a reader always holds a consistent point-in-time snapshot: the
/// parsed value, the raw text it was parsed from, the file it resolved to,
/// and when that content was last updated.
pub struct ConfigEntry {
    name: String,
    value: Arc<dyn Any + Send + Sync>,
    raw_text: String,
    file_path: PathBuf,
    last_updated: DateTime<Utc>,
}

impl ConfigEntry {
    pub(crate) fn new<T>(
        name: impl Into<String>,
        value: T,
        raw_text: String,
        file_path: PathBuf,
        last_updated: DateTime<Utc>,
    ) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            value: Arc::new(value),
            raw_text,
            file_path,
            last_updated,
        }
    }

    /// The logical name this entry is cached under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parsed value, if it is of type `T`.
    pub fn value<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// The raw text the value was parsed from.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The concrete file path the entry resolved to.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// When the winning content was last updated at its source.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}

impl std::fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigEntry")
            .field("name", &self.name)
            .field("file_path", &self.file_path)
            .field("last_updated", &self.last_updated)
            .finish_non_exhaustive()
    }
}

/// Concurrent mapping from logical name to cached entry.
///
/// The single source of truth readers consult. Lookups and removals are
/// non-blocking; [`upsert`](ConfigStore::upsert) runs its factory outside any
/// shard lock, so concurrent callers racing on the same absent name may both
/// load — that is tolerated, and the last writer into the map wins.
#[derive(Default)]
pub struct ConfigStore {
    entries: DashMap<String, Arc<ConfigEntry>>,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking lookup of a cached entry.
    pub fn get(&self, name: &str) -> Option<Arc<ConfigEntry>> {
        self.entries.get(name).map(|entry| Arc::clone(&entry))
    }

    /// Insert an entry for `name`, computing it with `factory` when needed.
    ///
    /// When an entry already exists and `force_update` is false this is a
    /// no-op: the load-once semantic that avoids redundant IO under
    /// high-concurrency first access. The factory runs without holding any
    /// map lock; racing inserts for the same name each produce an equivalent
    /// entry and the last writer wins.
    pub async fn upsert<F, Fut>(&self, name: &str, force_update: bool, factory: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ConfigEntry>,
    {
        if !force_update && self.entries.contains_key(name) {
            return;
        }
        let entry = factory().await;
        self.entries.insert(name.to_string(), Arc::new(entry));
    }

    /// Remove the entry for `name`. Removing an absent name is a no-op.
    pub fn remove(&self, name: &str) {
        if self.entries.remove(name).is_some() {
            debug!(name, "configuration entry invalidated");
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestValue {
        port: u16,
    }

    fn entry_with(port: u16) -> ConfigEntry {
        ConfigEntry::new(
            "Server",
            TestValue { port },
            format!(r#"{{"port":{port}}}"#),
            PathBuf::from("Server.conf"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = ConfigStore::new();
        store.upsert("Server", false, || async { entry_with(8080) }).await;

        let entry = store.get("Server").unwrap();
        let value = entry.value::<TestValue>().unwrap();
        assert_eq!(value.port, 8080);
        assert_eq!(entry.raw_text(), r#"{"port":8080}"#);
    }

    #[tokio::test]
    async fn test_upsert_without_force_is_load_once() {
        let store = ConfigStore::new();
        store.upsert("Server", false, || async { entry_with(8080) }).await;
        store.upsert("Server", false, || async {
            panic!("factory must not run when the entry exists")
        })
        .await;

        let entry = store.get("Server").unwrap();
        assert_eq!(entry.value::<TestValue>().unwrap().port, 8080);
    }

    #[tokio::test]
    async fn test_upsert_with_force_replaces() {
        let store = ConfigStore::new();
        store.upsert("Server", false, || async { entry_with(8080) }).await;
        store.upsert("Server", true, || async { entry_with(9090) }).await;

        let entry = store.get("Server").unwrap();
        assert_eq!(entry.value::<TestValue>().unwrap().port, 9090);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = ConfigStore::new();
        store.upsert("Server", false, || async { entry_with(8080) }).await;

        store.remove("Server");
        assert!(store.get("Server").is_none());
        store.remove("Server");
        store.remove("NeverExisted");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_value_downcast_mismatch_yields_none() {
        let store = ConfigStore::new();
        store.upsert("Server", false, || async { entry_with(8080) }).await;

        let entry = store.get("Server").unwrap();
        assert!(entry.value::<String>().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_survives_replacement() {
        let store = ConfigStore::new();
        store.upsert("Server", false, || async { entry_with(8080) }).await;
        let snapshot = store.get("Server").unwrap();

        store.upsert("Server", true, || async { entry_with(9090) }).await;

        // The old snapshot is still a consistent point-in-time view.
        assert_eq!(snapshot.value::<TestValue>().unwrap().port, 8080);
        let current = store.get("Server").unwrap();
        assert_eq!(current.value::<TestValue>().unwrap().port, 9090);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_upserts_do_not_corrupt() {
        let store = Arc::new(ConfigStore::new());
        let mut handles = Vec::new();

        for task in 0..64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let name = format!("Config{}", task % 8);
                store
                    .upsert(&name, false, || async move { entry_with(8080) })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 8);
        for i in 0..8 {
            let entry = store.get(&format!("Config{i}")).unwrap();
            assert_eq!(entry.value::<TestValue>().unwrap().port, 8080);
        }
    }
}
