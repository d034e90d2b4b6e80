//! Directory watch handles and their lifecycle.

use crate::core::{PathResolver, is_config_file};
use crate::error::Result;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, warn};

/// One OS-level watch over a single search directory.
///
/// Owns the underlying watcher; dropping it releases the watch resources.
struct DirWatch {
    dir: PathBuf,
    _watcher: RecommendedWatcher,
}

impl DirWatch {
    /// Watch `dir` recursively, forwarding relevant events into `tx`.
    ///
    /// The notify backend delivers events on its own thread; a full queue
    /// blocks that thread rather than dropping events.
    fn new(dir: &Path, tx: mpsc::Sender<Event>) -> Result<Self> {
        let watched_dir = dir.to_path_buf();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) if is_relevant(&event) => {
                    // Channel closed means the registry is shutting down.
                    let _ = tx.blocking_send(event);
                }
                Ok(_) => {}
                Err(err) => {
                    error!(dir = %watched_dir.display(), error = %err, "watch backend error");
                }
            }
        })?;
        watcher.watch(dir, RecursiveMode::Recursive)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            _watcher: watcher,
        })
    }
}

/// Whether an event can invalidate a cached configuration.
fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|path| is_config_file(path))
}

/// Owns the watch handles over the current search directories.
///
/// One handle per existing directory. The handle list is guarded by a mutex
/// so a rebuild (teardown then setup) is atomic with respect to concurrent
/// rebuild triggers: stale handles are never left alongside new ones, and two
/// racing rebuilds cannot interleave.
pub(crate) struct WatchManager {
    handles: Mutex<Vec<DirWatch>>,
    event_tx: StdMutex<Option<mpsc::Sender<Event>>>,
    running: AtomicBool,
}

impl WatchManager {
    /// A manager that never watches anything.
    pub(crate) fn disabled() -> Self {
        Self {
            handles: Mutex::new(Vec::new()),
            event_tx: StdMutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// A manager wired to a bounded event channel of the given capacity.
    ///
    /// The returned receiver feeds the registry's invalidation task.
    pub(crate) fn enabled(queue_capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(queue_capacity);
        (
            Self {
                handles: Mutex::new(Vec::new()),
                event_tx: StdMutex::new(Some(tx)),
                running: AtomicBool::new(false),
            },
            rx,
        )
    }

    /// Whether watching was enabled at construction and not yet shut down.
    pub(crate) fn is_enabled(&self) -> bool {
        self.event_tx.lock().expect("event_tx lock poisoned").is_some()
    }

    /// Whether any directory watches are currently active.
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Tear down all handles and set up one per existing search directory.
    ///
    /// The directory snapshot is read under the handle lock so the last of
    /// two racing rebuilds always wins with the freshest search-path list. A
    /// directory whose watch fails to initialize is logged and skipped; its
    /// watch stays degraded until the next rebuild.
    pub(crate) async fn rebuild(&self, resolver: &PathResolver) {
        let tx = match self.event_tx.lock().expect("event_tx lock poisoned").clone() {
            Some(tx) => tx,
            None => return,
        };

        let mut handles = self.handles.lock().await;
        handles.clear();

        for dir in resolver.search_dirs().iter() {
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "skipping missing search directory");
                continue;
            }
            match DirWatch::new(dir, tx.clone()) {
                Ok(watch) => {
                    debug!(dir = %watch.dir.display(), "watching search directory");
                    handles.push(watch);
                }
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "failed to watch search directory");
                }
            }
        }
        self.running.store(!handles.is_empty(), Ordering::Release);
    }

    /// Release all watch handles and close the event channel.
    ///
    /// Dropping every sender lets the invalidation task drain and exit.
    pub(crate) async fn shutdown(&self) {
        let mut handles = self.handles.lock().await;
        handles.clear();
        self.event_tx.lock().expect("event_tx lock poisoned").take();
        self.running.store(false, Ordering::Release);
        debug!("watch handles released");
    }

    /// Number of directories currently watched.
    #[cfg(test)]
    pub(crate) async fn watched_dir_count(&self) -> usize {
        self.handles.lock().await.len()
    }
}
