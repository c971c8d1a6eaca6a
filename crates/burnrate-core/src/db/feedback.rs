//! Burn rate feedback log

use rusqlite::params;

use super::targets::UPSERT_TARGET;
use super::{parse_column, parse_date_column, parse_datetime, Database};
use crate::error::Result;
use crate::models::{FeedbackEntry, FeedbackRecord, SpendingGroup};

const INSERT_FEEDBACK: &str = r#"
    INSERT INTO burn_feedback (burn_rate_group, date, sentiment, rate_at_feedback)
    VALUES (?, ?, ?, ?)
"#;

impl Database {
    /// Append a feedback record
    pub fn append_feedback(&self, record: &FeedbackRecord) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            INSERT_FEEDBACK,
            params![
                record.group.as_str(),
                record.date.to_string(),
                record.sentiment.as_str(),
                record.rate_at_feedback,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Append a feedback record and move the group's target in one transaction
    pub fn record_feedback(&self, record: &FeedbackRecord, new_target: Option<f64>) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            INSERT_FEEDBACK,
            params![
                record.group.as_str(),
                record.date.to_string(),
                record.sentiment.as_str(),
                record.rate_at_feedback,
            ],
        )?;
        let id = tx.last_insert_rowid();
        if let Some(value) = new_target {
            tx.execute(UPSERT_TARGET, params![record.group.as_str(), value])?;
        }

        tx.commit()?;
        Ok(id)
    }

    /// Recent feedback, newest first, optionally for one group
    pub fn list_feedback(
        &self,
        group: Option<SpendingGroup>,
        limit: i64,
    ) -> Result<Vec<FeedbackEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, burn_rate_group, date, sentiment, rate_at_feedback, created_at
            FROM burn_feedback
            WHERE ?1 IS NULL OR burn_rate_group = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )?;

        let entries = stmt
            .query_map(params![group.map(|g| g.as_str()), limit], |row| {
                let group_str: String = row.get(1)?;
                let date_str: String = row.get(2)?;
                let sentiment_str: String = row.get(3)?;
                let created_at_str: String = row.get(5)?;

                Ok(FeedbackEntry {
                    id: row.get(0)?,
                    record: FeedbackRecord {
                        group: parse_column(1, &group_str)?,
                        date: parse_date_column(2, &date_str)?,
                        sentiment: parse_column(3, &sentiment_str)?,
                        rate_at_feedback: row.get(4)?,
                    },
                    created_at: parse_datetime(&created_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
