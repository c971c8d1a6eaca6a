//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Load engine configuration for commands that run the engine
//! - `resolve_category` - Look a category up by ID or name
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use burnrate_core::models::Category;
use burnrate_core::{BurnRateConfig, Database};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load engine configuration, preferring an explicit `--config` path
pub fn load_config(path: Option<&Path>) -> Result<BurnRateConfig> {
    BurnRateConfig::load_with_override(path).context("Failed to load engine configuration")
}

/// Resolve a category argument that may be an ID or a name
pub fn resolve_category(db: &Database, arg: &str) -> Result<Category> {
    if let Ok(id) = arg.parse::<i64>() {
        if let Some(category) = db.get_category(id)? {
            return Ok(category);
        }
    }

    db.find_category_by_name(arg)?
        .ok_or_else(|| anyhow::anyhow!("Category not found: {}", arg))
}

pub fn cmd_init(db_path: &Path, config: &BurnRateConfig, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    db.seed_defaults(config)
        .context("Failed to seed default categories")?;
    println!("   Seeded default categories and targets");

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: burnrate import --file statement.csv --account Visa");
    println!("  2. Check your burn rate: burnrate burn");
    println!("  3. Start web UI: burnrate serve");

    Ok(())
}
