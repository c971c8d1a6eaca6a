//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_date_column, parse_datetime, Database};
use crate::burn::{PoolEntry, PoolFilter};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionQuery};

const TRANSACTION_COLUMNS: &str = "id, account_id, date, description, amount, category_id, needs_review, is_recurring, is_explosion, import_hash, created_at";

/// Maximum rows returned by a single listing
const MAX_LIMIT: i64 = 1000;

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(2)?;
    let created_at_str: String = row.get(10)?;

    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        date: parse_date_column(2, &date_str)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        category_id: row.get(5)?,
        needs_review: row.get(6)?,
        is_recurring: row.get(7)?,
        is_explosion: row.get(8)?,
        import_hash: row.get(9)?,
        created_at: parse_datetime(&created_at_str),
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

impl Database {
    /// Insert a transaction (skips duplicates based on import_hash)
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE import_hash = ?",
                params![tx.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None);
        }

        conn.execute(
            r#"
            INSERT INTO transactions (account_id, date, description, amount, category_id, needs_review, import_hash, original_data)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.account_id,
                tx.date.to_string(),
                tx.description,
                tx.amount,
                tx.category_id,
                tx.needs_review,
                tx.import_hash,
                tx.original_data,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                params![id],
                transaction_from_row,
            )
            .optional()?;

        Ok(tx)
    }

    /// List transactions, newest first
    pub fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(aid) = query.account_id {
            conditions.push("account_id = ?");
            params.push(Box::new(aid));
        }
        if let Some(cid) = query.category_id {
            conditions.push("category_id = ?");
            params.push(Box::new(cid));
        }
        if let Some(review) = query.needs_review {
            conditions.push("needs_review = ?");
            params.push(Box::new(review));
        }
        if let Some(from) = query.from {
            conditions.push("date >= ?");
            params.push(Box::new(from.to_string()));
        }
        if let Some(to) = query.to {
            conditions.push("date <= ?");
            params.push(Box::new(to.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        params.push(Box::new(query.limit.unwrap_or(100).clamp(1, MAX_LIMIT)));
        params.push(Box::new(query.offset.unwrap_or(0).max(0)));

        let sql = format!(
            "SELECT {} FROM transactions {} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
            TRANSACTION_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let transactions = stmt
            .query_map(params_refs.as_slice(), transaction_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Transactions waiting for a category, newest first
    pub fn review_queue(&self, limit: i64) -> Result<Vec<Transaction>> {
        self.list_transactions(&TransactionQuery {
            needs_review: Some(true),
            limit: Some(limit),
            ..Default::default()
        })
    }

    /// Count transactions (total, needing review)
    pub fn count_transactions(&self) -> Result<(i64, i64)> {
        let conn = self.conn()?;
        let counts = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(needs_review), 0) FROM transactions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(counts)
    }

    /// Set a transaction's category and clear its review flag
    pub fn set_transaction_category(&self, id: i64, category_id: i64) -> Result<()> {
        if self.get_category(category_id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", category_id)));
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE transactions SET category_id = ?, needs_review = 0 WHERE id = ?",
            params![category_id, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }
        Ok(())
    }

    /// Categorize many transactions at once, returning how many were updated
    pub fn categorize_transactions(&self, ids: &[i64], category_id: i64) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        if self.get_category(category_id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", category_id)));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE transactions SET category_id = ?, needs_review = 0 WHERE id = ?",
            )?;
            for id in ids {
                updated += stmt.execute(params![category_id, id])?;
            }
        }
        tx.commit()?;

        Ok(updated)
    }

    /// Update the recurring/explosion flags that control burn rate pools
    pub fn set_transaction_flags(
        &self,
        id: i64,
        is_recurring: Option<bool>,
        is_explosion: Option<bool>,
    ) -> Result<()> {
        let current = self
            .get_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;

        let conn = self.conn()?;
        conn.execute(
            "UPDATE transactions SET is_recurring = ?, is_explosion = ? WHERE id = ?",
            params![
                is_recurring.unwrap_or(current.is_recurring),
                is_explosion.unwrap_or(current.is_explosion),
                id
            ],
        )?;
        Ok(())
    }

    /// Expenses dated within `[from, to]` for a burn rate pool.
    ///
    /// The regular pool takes `category_ids` minus recurring and
    /// explosion-flagged rows. The explosion pool takes `category_ids`
    /// unfiltered plus explosion-flagged expenses from any category.
    pub fn query_pool(
        &self,
        category_ids: &[i64],
        from: NaiveDate,
        to: NaiveDate,
        filter: PoolFilter,
    ) -> Result<Vec<PoolEntry>> {
        let membership = match (filter, category_ids.is_empty()) {
            (PoolFilter::Regular, true) => return Ok(Vec::new()),
            (PoolFilter::Regular, false) => format!(
                "category_id IN ({}) AND is_recurring = 0 AND is_explosion = 0",
                placeholders(category_ids.len())
            ),
            (PoolFilter::Explosion, true) => "is_explosion = 1".to_string(),
            (PoolFilter::Explosion, false) => format!(
                "(category_id IN ({}) OR is_explosion = 1)",
                placeholders(category_ids.len())
            ),
        };

        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT date, amount, category_id FROM transactions
            WHERE {}
              AND date >= ? AND date <= ?
              AND amount < 0
            ORDER BY date
            "#,
            membership
        );

        let mut params: Vec<Box<dyn rusqlite::ToSql>> = category_ids
            .iter()
            .map(|id| Box::new(*id) as Box<dyn rusqlite::ToSql>)
            .collect();
        params.push(Box::new(from.to_string()));
        params.push(Box::new(to.to_string()));
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let pool = stmt
            .query_map(params_refs.as_slice(), |row| {
                let date_str: String = row.get(0)?;
                Ok(PoolEntry {
                    date: parse_date_column(0, &date_str)?,
                    amount: row.get(1)?,
                    category_id: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(pool)
    }
}
