//! Example demonstrating filesystem-watch-driven invalidation.
//!
//! This example shows how to:
//! - Build a registry over a search directory
//! - Read a typed configuration by logical name
//! - See edits to the backing file picked up automatically
//!
//! Run with: cargo run --example hot_reload
//!
//! While running, try editing demos/config/Server.conf to see reloads.

use confreg::prelude::*;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
struct ServerConfig {
    port: u16,
    host: String,
    max_connections: u32,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    println!("=== Hot Reload Example ===\n");

    // Create an initial config file if it doesn't exist
    let config_dir = "demos/config";
    let config_path = "demos/config/Server.conf";
    std::fs::create_dir_all(config_dir)?;
    if !std::path::Path::new(config_path).exists() {
        std::fs::write(
            config_path,
            r#"{"port":8080,"host":"localhost","max_connections":10}"#,
        )?;
        println!("Created {}", config_path);
    }

    // Build the registry; watching is on by default.
    let registry = ConfigRegistry::builder()
        .with_search_path(config_dir)
        .build()
        .await;

    println!("Registry built, watching {}\n", config_dir);

    let cfg = registry
        .get_create_config::<ServerConfig>("Server", None, false)
        .await;
    println!("Current configuration:");
    println!(
        "  Server: {}:{} (max connections: {})",
        cfg.host, cfg.port, cfg.max_connections
    );

    println!("\n===> Try editing {} to see reloads! <===", config_path);
    println!("     Example changes:");
    println!("     - Change port: 8080 -> 9090");
    println!("     - Change host: localhost -> 0.0.0.0");
    println!("     - Delete the file to fall back to defaults");
    println!("\nPress Ctrl+C to exit\n");

    // A changed file evicts the cached entry; get_create_config then
    // reloads it lazily.
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        let cfg = registry
            .get_create_config::<ServerConfig>("Server", None, false)
            .await;
        println!(
            "[Status] Server: {}:{} (max: {})",
            cfg.host, cfg.port, cfg.max_connections
        );
    }
}
