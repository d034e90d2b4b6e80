//! Example backing the registry with an external key-value store.
//!
//! This example shows how to:
//! - Implement `ExternalSource` over an in-memory store
//! - Let newest-timestamp-wins reconciliation pick between file and store
//! - Observe newer file content being written back to the store
//!
//! Run with: cargo run --example external_store

use async_trait::async_trait;
use chrono::{Duration, Utc};
use confreg::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
struct FeatureFlags {
    enable_cache: bool,
    rollout_percent: u8,
}

/// An in-memory stand-in for a remote key-value service.
struct MemoryStore {
    items: Mutex<HashMap<String, ConfigurationItem>>,
}

#[async_trait]
impl ExternalSource for MemoryStore {
    async fn get(&self, name: &str) -> Result<ConfigurationItem> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_else(|| ConfigurationItem::empty(name)))
    }

    async fn put(&self, item: ConfigurationItem) -> Result<()> {
        println!("[store] received put for '{}'", item.name);
        self.items.lock().unwrap().insert(item.name.clone(), item);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    println!("=== External Store Example ===\n");

    let config_dir = "demos/config";
    std::fs::create_dir_all(config_dir)?;
    std::fs::write(
        "demos/config/Flags.conf",
        r#"{"enable_cache":true,"rollout_percent":10}"#,
    )?;

    // Seed the store with content newer than the file: the store wins.
    let store = Arc::new(MemoryStore {
        items: Mutex::new(HashMap::from([(
            "Flags".to_string(),
            ConfigurationItem {
                name: "Flags".to_string(),
                data: r#"{"enable_cache":false,"rollout_percent":50}"#.to_string(),
                last_updated: Utc::now() + Duration::hours(1),
                from_external: true,
            },
        )])),
    });

    let registry = ConfigRegistry::builder()
        .with_search_path(config_dir)
        .with_external_source(Arc::clone(&store) as Arc<dyn ExternalSource>)
        .with_file_watch(false)
        .build()
        .await;

    let flags = registry
        .get_create_config::<FeatureFlags>("Flags", None, false)
        .await;
    println!(
        "store content won: enable_cache={} rollout={}%",
        flags.enable_cache, flags.rollout_percent
    );

    // Drop the store's entry; the file is now strictly newer, so the next
    // forced reload parses the file and pushes its content to the store.
    store.items.lock().unwrap().remove("Flags");
    let flags = registry
        .get_create_config::<FeatureFlags>("Flags", None, true)
        .await;
    println!(
        "file content won: enable_cache={} rollout={}%",
        flags.enable_cache, flags.rollout_percent
    );

    // Give the background put a moment to land.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let stored = store.items.lock().unwrap().get("Flags").cloned();
    match stored {
        Some(item) => println!("store now holds: {}", item.data),
        None => println!("store received no write-back"),
    }

    Ok(())
}
