//! Logical-name-to-path resolution over an ordered search-directory list.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Reserved logical name of the search-path configuration.
///
/// The entry under this name holds the ordered directory list every other
/// lookup searches. It is loaded, cached, and invalidated through the same
/// machinery as any other configuration — it is privileged only by name.
pub const SEARCH_PATH_CONFIG: &str = "SearchPath";

/// File extension for configuration files.
pub const CONF_EXTENSION: &str = "conf";

/// Extension marker preferred during development-mode resolution
/// (`Name.dev.conf` over `Name.conf`).
pub const DEV_MARKER: &str = "dev";

/// Ordered list of directories to search when resolving a logical name.
///
/// Serialized as a plain JSON array of paths, so a `SearchPath.conf` file
/// looks like `["/etc/myapp", "/opt/myapp/conf"]`. An empty list means "use
/// the fallback": the process base install directory, or whatever the
/// registry builder was configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchPaths(pub Vec<PathBuf>);

/// The directory the running executable was installed to, with trailing
/// `bin`/`debug`/`release` segments stripped.
pub(crate) fn default_base_dir() -> PathBuf {
    let mut dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    while matches!(
        dir.file_name().and_then(OsStr::to_str),
        Some("bin" | "debug" | "release")
    ) {
        dir.pop();
    }
    dir
}

/// Resolves logical configuration names to concrete filesystem paths.
///
/// Holds the current search-directory snapshot in an [`ArcSwap`] so
/// resolution never takes a lock: readers see the last directory list that a
/// search-path load published, even while the search-path entry itself is
/// mid-invalidation.
pub struct PathResolver {
    dev_mode: bool,
    fallback_dirs: Vec<PathBuf>,
    search_dirs: ArcSwap<Vec<PathBuf>>,
}

impl PathResolver {
    /// Create a resolver with the given dev-mode flag and fallback directories.
    ///
    /// The fallback applies whenever the search-path configuration yields an
    /// empty directory list.
    pub fn new(dev_mode: bool, fallback_dirs: Vec<PathBuf>) -> Self {
        let initial = fallback_dirs.clone();
        Self {
            dev_mode,
            fallback_dirs,
            search_dirs: ArcSwap::from_pointee(initial),
        }
    }

    /// Whether development-mode resolution is active.
    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Publish a freshly loaded search-path list.
    ///
    /// An empty list falls back to the configured base directories.
    pub(crate) fn set_search_paths(&self, paths: &SearchPaths) {
        let dirs = if paths.0.is_empty() {
            self.fallback_dirs.clone()
        } else {
            paths.0.clone()
        };
        debug!(dirs = ?dirs, "search directories updated");
        self.search_dirs.store(Arc::new(dirs));
    }

    /// The current search-directory snapshot, in resolution order.
    pub fn search_dirs(&self) -> Arc<Vec<PathBuf>> {
        self.search_dirs.load_full()
    }

    /// Resolve a logical path to a concrete file path.
    ///
    /// Absolute paths pass through unchanged. Relative paths are searched for
    /// recursively under each search directory in order; within a directory a
    /// dev-mode variant (`Name.dev.conf`) takes precedence over the plain
    /// name, and resolution stops at the first directory that yields any
    /// match. If nothing matches, the logical path is returned unchanged so
    /// the downstream read fails as "file not found" and defaults apply.
    pub fn resolve(&self, logical: &Path) -> PathBuf {
        if logical.is_absolute() {
            return logical.to_path_buf();
        }

        let Some(file_name) = logical.file_name() else {
            return logical.to_path_buf();
        };
        // The dev variant is derived from the file name alone; like the plain
        // match below, directory components never take part in tree search.
        let dev_name = self.dev_mode.then(|| dev_variant(Path::new(file_name)));

        for dir in self.search_dirs.load().iter() {
            if !dir.is_dir() {
                continue;
            }
            if let Some(dev_name) = &dev_name {
                if let Some(hit) = find_in_tree(dir, dev_name.as_os_str()) {
                    return hit;
                }
            }
            if let Some(hit) = find_in_tree(dir, file_name) {
                return hit;
            }
        }

        logical.to_path_buf()
    }

    /// Derive the logical configuration name from a file path.
    ///
    /// Strips directory components and the `.conf` extension; when dev mode
    /// is active the `.dev` marker is stripped as well, so `a/b/Name.dev.conf`
    /// and `Name.conf` both normalize to `Name`.
    pub fn normalize_name(&self, raw: &str) -> String {
        normalize_name(raw, self.dev_mode)
    }
}

/// `Name.conf` -> `Name.dev.conf`
fn dev_variant(file_name: &Path) -> PathBuf {
    let mut variant = file_name.to_path_buf();
    variant.set_extension(format!("{DEV_MARKER}.{CONF_EXTENSION}"));
    variant
}

/// Depth-first search for a file named `target` under `dir`, shallower
/// entries first within each directory.
fn find_in_tree(dir: &Path, target: &OsStr) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name() == Some(target) {
            return Some(path);
        }
    }

    subdirs.into_iter().find_map(|sub| find_in_tree(&sub, target))
}

pub(crate) fn normalize_name(raw: &str, dev_mode: bool) -> String {
    let path = Path::new(raw);
    let Some(file_name) = path.file_name() else {
        return raw.to_string();
    };

    let mut name = Path::new(file_name);
    if name.extension().and_then(OsStr::to_str) == Some(CONF_EXTENSION) {
        name = Path::new(name.file_stem().unwrap_or(file_name));
    }
    if dev_mode && name.extension().and_then(OsStr::to_str) == Some(DEV_MARKER) {
        name = Path::new(name.file_stem().unwrap_or(file_name));
    }
    name.to_string_lossy().into_owned()
}

/// Whether a path looks like a configuration file.
#[cfg(feature = "file-watch")]
pub(crate) fn is_config_file(path: &Path) -> bool {
    path.extension().and_then(OsStr::to_str) == Some(CONF_EXTENSION)
}
