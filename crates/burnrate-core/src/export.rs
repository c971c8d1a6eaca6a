//! Transaction CSV export

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::error::{Error, Result};

/// Filters for a transaction export
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Start date (inclusive)
    pub from: Option<NaiveDate>,
    /// End date (inclusive)
    pub to: Option<NaiveDate>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
}

/// One exported transaction with its account and category names
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount", serialize_with = "cents")]
    pub amount: f64,
}

fn cents<S: serde::Serializer>(amount: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", amount))
}

impl Database {
    /// Transactions matching `opts`, newest first
    pub fn export_transactions(&self, opts: &ExportOptions) -> Result<Vec<ExportRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.date, a.name, c.name, t.description, t.amount
            FROM transactions t
            JOIN accounts a ON a.id = t.account_id
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE (?1 IS NULL OR t.date >= ?1)
              AND (?2 IS NULL OR t.date <= ?2)
              AND (?3 IS NULL OR t.account_id = ?3)
              AND (?4 IS NULL OR t.category_id = ?4)
            ORDER BY t.date DESC, t.id DESC
            "#,
        )?;

        let rows = stmt
            .query_map(
                rusqlite::params![
                    opts.from.map(|d| d.to_string()),
                    opts.to.map(|d| d.to_string()),
                    opts.account_id,
                    opts.category_id,
                ],
                |row| {
                    Ok(ExportRow {
                        date: row.get(0)?,
                        account: row.get(1)?,
                        category: row.get(2)?,
                        description: row.get(3)?,
                        amount: row.get(4)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Transactions matching `opts` as CSV with a
    /// `Date,Account,Category,Description,Amount` header
    pub fn export_transactions_csv(&self, opts: &ExportOptions) -> Result<String> {
        let rows = self.export_transactions(opts)?;

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        if rows.is_empty() {
            writer.write_record(["Date", "Account", "Category", "Description", "Amount"])?;
        }
        for row in &rows {
            writer.serialize(row)?;
        }

        let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| Error::InvalidData(format!("Export is not valid UTF-8: {}", e)))
    }
}
