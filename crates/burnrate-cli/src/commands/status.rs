//! Status command implementation

use std::fs;
use std::path::Path;

use anyhow::Result;
use burnrate_core::db::DB_KEY_ENV;
use burnrate_core::Database;

use super::open_db;

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!();
    println!("📊 Burn Rate Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => print_counts(&db)?,
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

/// Row counts and current targets
pub fn print_counts(db: &Database) -> Result<()> {
    let accounts = db.list_accounts()?;
    let (total, needs_review) = db.count_transactions()?;

    println!();
    println!("   Accounts: {}", accounts.len());
    println!("   Transactions: {}", total);
    if needs_review > 0 {
        println!("   📝 Needs review: {}", needs_review);
    }
    println!("   Rules: {}", db.list_rules()?.len());

    for target in db.list_targets()? {
        println!(
            "   🎯 {} target: ${:.2}/day",
            target.group, target.daily_target
        );
    }

    Ok(())
}
