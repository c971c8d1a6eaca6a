//! Account operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, parse_datetime, Database};
use crate::error::Result;
use crate::models::{Account, CsvFormat};

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let format_str: String = row.get(2)?;
    let created_at_str: String = row.get(3)?;

    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        format: parse_column(2, &format_str)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Create or get an account
    pub fn upsert_account(&self, name: &str, format: CsvFormat) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM accounts WHERE name = ? AND format = ?",
                params![name, format.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO accounts (name, format) VALUES (?, ?)",
            params![name, format.as_str()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all accounts
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, format, created_at FROM accounts ORDER BY name")?;

        let accounts = stmt
            .query_map([], account_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get an account by ID
    pub fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                "SELECT id, name, format, created_at FROM accounts WHERE id = ?",
                params![id],
                account_from_row,
            )
            .optional()?;

        Ok(account)
    }
}
