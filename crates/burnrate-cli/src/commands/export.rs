//! Export command implementation

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use burnrate_core::{Database, ExportOptions};
use chrono::NaiveDate;

use super::resolve_category;

fn parse_date_arg(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("Invalid --{} date format (use YYYY-MM-DD)", flag))
}

pub fn cmd_export(
    db: &Database,
    output: Option<&Path>,
    from: Option<&str>,
    to: Option<&str>,
    account: Option<i64>,
    category: Option<&str>,
) -> Result<()> {
    let category_id = category
        .map(|c| resolve_category(db, c).map(|c| c.id))
        .transpose()?;

    let opts = ExportOptions {
        from: parse_date_arg(from, "from")?,
        to: parse_date_arg(to, "to")?,
        account_id: account,
        category_id,
    };

    let csv = db.export_transactions_csv(&opts)?;

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(csv.as_bytes())?;

            let lines = csv.lines().count().saturating_sub(1);
            println!("✅ Exported {} transactions to {}", lines, path.display());
        }
        None => print!("{}", csv),
    }

    Ok(())
}
