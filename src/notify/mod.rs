//! Filesystem-change-driven cache invalidation.
//!
//! Watches the search directories and forwards relevant events into a bounded
//! channel consumed by the registry's invalidation task.

mod watcher;

pub(crate) use watcher::WatchManager;
