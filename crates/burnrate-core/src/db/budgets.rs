//! Monthly category budgets

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetStatus, NewBudget};

impl Database {
    /// Create a budget, or replace the amount of the one already set for
    /// that category and month
    pub fn upsert_budget(&self, budget: &NewBudget) -> Result<Budget> {
        if !budget.monthly_amount.is_finite() || budget.monthly_amount < 0.0 {
            return Err(Error::InvalidData(
                "monthly_amount must be a non-negative number".into(),
            ));
        }
        if self.get_category(budget.category_id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", budget.category_id)));
        }

        let month = budget.effective_date.format("%Y-%m").to_string();
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (category_id, monthly_amount, month)
            VALUES (?, ?, ?)
            ON CONFLICT(category_id, month) DO UPDATE SET
                monthly_amount = excluded.monthly_amount
            "#,
            params![budget.category_id, budget.monthly_amount, month],
        )?;

        let stored = conn.query_row(
            r#"
            SELECT id, category_id, monthly_amount, month, created_at
            FROM budgets WHERE category_id = ? AND month = ?
            "#,
            params![budget.category_id, month],
            |row| {
                let created_at_str: String = row.get(4)?;
                Ok(Budget {
                    id: row.get(0)?,
                    category_id: row.get(1)?,
                    monthly_amount: row.get(2)?,
                    month: row.get(3)?,
                    created_at: parse_datetime(&created_at_str),
                })
            },
        )?;

        Ok(stored)
    }

    /// Budgets with the month's spending in their category, optionally for
    /// one `YYYY-MM` month
    pub fn list_budgets(&self, month: Option<&str>) -> Result<Vec<BudgetStatus>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT b.id, b.category_id, c.name, b.monthly_amount, b.month,
                   COALESCE(SUM(CASE WHEN t.amount < 0 THEN -t.amount ELSE 0 END), 0)
            FROM budgets b
            JOIN categories c ON c.id = b.category_id
            LEFT JOIN transactions t ON t.category_id = b.category_id
                AND strftime('%Y-%m', t.date) = b.month
            WHERE ?1 IS NULL OR b.month = ?1
            GROUP BY b.id
            ORDER BY b.month DESC, c.display_order, c.name
            "#,
        )?;

        let budgets = stmt
            .query_map(params![month], |row| {
                let budget_amount: f64 = row.get(3)?;
                let actual_spent: f64 = row.get(5)?;
                let percent_used = if budget_amount > 0.0 {
                    (actual_spent / budget_amount * 1000.0).round() / 10.0
                } else {
                    0.0
                };
                Ok(BudgetStatus {
                    id: row.get(0)?,
                    category_id: row.get(1)?,
                    category_name: row.get(2)?,
                    budget_amount,
                    budget_month: row.get(4)?,
                    actual_spent,
                    remaining: budget_amount - actual_spent,
                    percent_used,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Delete a budget
    pub fn delete_budget(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Budget {}", id)));
        }
        Ok(())
    }
}
