//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` - Resolve configuration with CLI overrides
//! - `open_store` / `open_ai` - Build the store and AI client from config
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use pennywise_core::{
    config::StoreBackend, AIClient, Config, SqliteStore, StoreClient, TransactionStore,
};
use tracing::debug;

/// Load configuration, letting `--db` select a SQLite file
pub fn load_config(path: Option<&Path>, db: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(path).context("Failed to load configuration")?;

    if let Some(db) = db {
        config.store.backend = StoreBackend::Sqlite;
        config.store.path = db.to_string_lossy().into_owned();
    }

    debug!(
        store = ?config.store.backend,
        path = %config.store.path,
        ai = ?config.ai.backend,
        "Resolved configuration"
    );
    Ok(config)
}

/// Open the configured transaction store
pub fn open_store(config: &Config) -> Result<StoreClient> {
    StoreClient::from_config(&config.store)
        .with_context(|| format!("Failed to open store at {}", config.store.path))
}

/// Build the AI client, if any backend is configured
pub fn open_ai(config: &Config) -> Option<AIClient> {
    AIClient::from_config(&config.ai)
}

pub fn cmd_init(config: &Config) -> Result<()> {
    if config.store.backend == StoreBackend::Memory {
        println!("ℹ️  The memory store needs no initialization (demo data is loaded on start).");
        return Ok(());
    }

    println!("🔧 Initializing database at {}...", config.store.path);

    let store = SqliteStore::open(&config.store.path).context("Failed to open database")?;
    if !store.health_check() {
        anyhow::bail!("Database at {} is not responding", config.store.path);
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Get a template: pennywise template > transactions.csv");
    println!("  2. Import transactions: pennywise import --file transactions.csv");
    println!("  3. See predictions: pennywise predict");

    Ok(())
}
