//! # confreg
//!
//! Process-wide typed configuration registry with filesystem-watch
//! invalidation and non-blocking reads.
//!
//! ## Overview
//!
//! `confreg` loads JSON configuration files into strongly typed values,
//! caches them under logical names, and keeps the cache current by watching
//! the search directories for changes:
//!
//! - Logical names resolve to `<name>.conf` files searched recursively
//!   through an ordered directory list (itself a configuration, hot-reloaded
//!   like any other).
//! - Reads are concurrent and non-blocking; a cached entry is an immutable
//!   snapshot replaced wholesale on reload.
//! - A filesystem event evicts the affected entry; the next access reloads
//!   it lazily.
//! - Nothing here ever fails toward the caller: missing files, IO errors,
//!   and malformed content all degrade to the type's default value, visible
//!   only in logs. Configuration unavailability must never crash a
//!   long-running service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use confreg::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct TestConfig {
//!     foo: String,
//!     bar: String,
//! }
//!
//! # async fn example() {
//! let registry = ConfigRegistry::builder()
//!     .with_search_path("config")
//!     .build()
//!     .await;
//!
//! // Loads config/Test1.conf on first access; cached and watched afterwards.
//! let cfg = registry.get_create_config::<TestConfig>("Test1", None, false).await;
//! println!("foo = {}", cfg.foo);
//!
//! // Non-blocking cached read; defaults if the entry is absent.
//! let cfg = registry.get_config::<TestConfig>("Test1");
//! # }
//! ```
//!
//! ## Development mode
//!
//! With [`with_dev_mode`](core::ConfigRegistryBuilder::with_dev_mode), a
//! `Name.dev.conf` file takes precedence over `Name.conf` within the same
//! search directory, letting a checkout carry development overrides next to
//! the real configuration.
//!
//! ## External stores
//!
//! An optional [`ExternalSource`](sources::ExternalSource) backs
//! configuration with a store other than the local filesystem. File and
//! external content are reconciled newest-timestamp-wins (ties favor the
//! file), and newer file content is written back on a background task.
//!
//! ## Feature Flags
//!
//! - `file-watch` *(default)* — filesystem-change-driven invalidation via the
//!   `notify` crate. Without it, entries invalidate only through explicit
//!   removal or forced reloads.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod sources;

#[cfg(feature = "file-watch")]
mod notify;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        ConfigEntry, ConfigRegistry, ConfigRegistryBuilder, SEARCH_PATH_CONFIG, SearchPaths,
    };
    pub use crate::error::{ConfigError, Result};
    pub use crate::sources::{ConfigurationItem, ExternalSource};
}
