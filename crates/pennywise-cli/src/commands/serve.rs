//! Server command implementation

use anyhow::Result;
use pennywise_core::{config::StoreBackend, Config};

pub async fn cmd_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("🚀 Starting Pennywise web server...");
    match config.store.backend {
        StoreBackend::Sqlite => println!("   Database: {}", config.store.path),
        StoreBackend::Memory => println!("   Store: in-memory demo data"),
    }
    println!(
        "   Listening: http://{}:{}",
        config.server.host, config.server.port
    );
    if config.server.allowed_origins.is_empty() {
        println!("   CORS: same-origin only");
    } else {
        println!("   CORS: {}", config.server.allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    pennywise_server::serve(config).await
}
