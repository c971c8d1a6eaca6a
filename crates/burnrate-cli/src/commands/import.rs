//! Import command implementation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use burnrate_core::import::{detect_format, ingest};
use burnrate_core::models::CsvFormat;
use burnrate_core::Database;

pub fn cmd_import(
    db: &Database,
    file: &Path,
    account_name: &str,
    format_str: Option<&str>,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    // Determine CSV layout
    let format: CsvFormat = match format_str {
        Some(s) => s.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => detect_format(&content),
    };

    println!("📥 Importing {} export from {}...", format, file.display());

    let account_id = db.upsert_account(account_name, format)?;
    let summary = ingest(db, account_id, content.as_bytes(), Some(format))
        .with_context(|| format!("Failed to import {}", file.display()))?;

    db.log_audit(
        "cli",
        "import",
        Some("transactions"),
        Some(account_id),
        Some(&format!(
            "new={}, duplicates={}, review={}, errors={}",
            summary.new_count, summary.duplicate_count, summary.review_count, summary.error_count
        )),
    )?;

    println!();
    println!("✅ Import complete!");
    println!("   Account: {} (id: {})", account_name, account_id);
    println!("   New transactions: {}", summary.new_count);
    println!("   Skipped (duplicates): {}", summary.duplicate_count);
    println!("   🏷️  Categorized by rules: {}", summary.categorized_count);
    if summary.review_count > 0 {
        println!("   📝 Needs review: {}", summary.review_count);
    }
    if summary.error_count > 0 {
        println!("   ⚠️  Rows with errors: {}", summary.error_count);
        for error in &summary.errors {
            println!("      {}", error);
        }
    }

    if summary.review_count > 0 {
        println!();
        println!("Run 'burnrate transactions review' to categorize the rest.");
    }

    Ok(())
}
