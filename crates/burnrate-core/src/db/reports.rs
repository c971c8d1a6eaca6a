//! Dashboard rollups

use chrono::{Duration, Months, NaiveDate};
use rusqlite::params;

use super::{Database, DbConn};
use crate::error::{Error, Result};
use crate::models::{
    CategorySpending, Dashboard, DashboardSummary, MonthlyTotals, ReportPeriod, TransactionQuery,
};

/// Transactions shown in the dashboard's recent list
const RECENT_LIMIT: i64 = 10;

/// Net amount and expense total within `[from, to]`
fn period_totals(
    conn: &DbConn,
    from: NaiveDate,
    to: NaiveDate,
    account_id: Option<i64>,
) -> Result<(f64, f64)> {
    let totals = conn.query_row(
        r#"
        SELECT COALESCE(SUM(amount), 0),
               COALESCE(SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END), 0)
        FROM transactions
        WHERE date >= ?1 AND date <= ?2
          AND (?3 IS NULL OR account_id = ?3)
        "#,
        params![from.to_string(), to.to_string(), account_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(totals)
}

impl Database {
    /// Summary, category breakdown, twelve-month trend and recent activity
    /// for `[from, to]`, optionally limited to one account
    pub fn get_dashboard(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        account_id: Option<i64>,
    ) -> Result<Dashboard> {
        if to < from {
            return Err(Error::InvalidData(format!(
                "Report range ends ({}) before it starts ({})",
                to, from
            )));
        }

        let conn = self.conn()?;

        let net_worth: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE ?1 IS NULL OR account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?;

        // Same-length period ending the day before `from`
        let period_days = (to - from).num_days() + 1;
        let prior_to = from - Duration::days(1);
        let prior_from = from - Duration::days(period_days);

        let (net_change, spending) = period_totals(&conn, from, to, account_id)?;
        let (_, previous_spending) = period_totals(&conn, prior_from, prior_to, account_id)?;

        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.name, SUM(-t.amount) AS total
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.amount < 0
              AND t.date >= ?1 AND t.date <= ?2
              AND (?3 IS NULL OR t.account_id = ?3)
            GROUP BY c.id
            ORDER BY total DESC, c.name
            "#,
        )?;
        let by_category = stmt
            .query_map(
                params![from.to_string(), to.to_string(), account_id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, f64>(2)?)),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let categorized_total: f64 = by_category.iter().map(|(_, _, amount)| amount).sum();
        let spending_by_category: Vec<CategorySpending> = by_category
            .into_iter()
            .map(|(category_id, category_name, amount)| CategorySpending {
                category_id,
                category_name,
                amount,
                percentage: if categorized_total > 0.0 {
                    (amount / categorized_total * 1000.0).round() / 10.0
                } else {
                    0.0
                },
            })
            .collect();

        let trend_from = to.checked_sub_months(Months::new(12)).unwrap_or(from);
        let mut stmt = conn.prepare(
            r#"
            SELECT strftime('%Y-%m', date) AS month,
                   SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END),
                   SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END)
            FROM transactions
            WHERE date > ?1 AND date <= ?2
              AND (?3 IS NULL OR account_id = ?3)
            GROUP BY month
            ORDER BY month
            "#,
        )?;
        let monthly_trend = stmt
            .query_map(
                params![trend_from.to_string(), to.to_string(), account_id],
                |row| {
                    Ok(MonthlyTotals {
                        month: row.get(0)?,
                        income: row.get(1)?,
                        expenses: row.get(2)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let (_, pending_review_count) = self.count_transactions()?;
        let recent_transactions = self.list_transactions(&TransactionQuery {
            account_id,
            limit: Some(RECENT_LIMIT),
            ..Default::default()
        })?;

        let (top_category, top_category_amount) = spending_by_category
            .first()
            .map(|c| (Some(c.category_name.clone()), c.amount))
            .unwrap_or((None, 0.0));

        Ok(Dashboard {
            period: ReportPeriod { from, to },
            summary: DashboardSummary {
                net_worth,
                net_change,
                spending,
                previous_spending,
                top_category,
                top_category_amount,
                pending_review_count,
            },
            spending_by_category,
            monthly_trend,
            recent_transactions,
        })
    }
}
