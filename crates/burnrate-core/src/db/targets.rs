//! Group targets and key/value settings

use rusqlite::{params, OptionalExtension};

use super::{parse_column, parse_datetime, Database};
use crate::error::Result;
use crate::models::{GroupTarget, SpendingGroup};

pub(super) const UPSERT_TARGET: &str = r#"
    INSERT INTO group_targets (burn_rate_group, daily_target, updated_at)
    VALUES (?, ?, CURRENT_TIMESTAMP)
    ON CONFLICT(burn_rate_group) DO UPDATE SET
        daily_target = excluded.daily_target,
        updated_at = CURRENT_TIMESTAMP
"#;

impl Database {
    /// Daily target for a group, if one has been stored
    pub fn get_target(&self, group: SpendingGroup) -> Result<Option<f64>> {
        let conn = self.conn()?;
        let target = conn
            .query_row(
                "SELECT daily_target FROM group_targets WHERE burn_rate_group = ?",
                params![group.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(target)
    }

    /// Store a group's daily target (last write wins)
    pub fn set_target(&self, group: SpendingGroup, value: f64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(UPSERT_TARGET, params![group.as_str(), value])?;
        Ok(())
    }

    /// All stored targets
    pub fn list_targets(&self) -> Result<Vec<GroupTarget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT burn_rate_group, daily_target, updated_at FROM group_targets ORDER BY burn_rate_group",
        )?;

        let targets = stmt
            .query_map([], |row| {
                let group_str: String = row.get(0)?;
                let updated_at_str: String = row.get(2)?;
                Ok(GroupTarget {
                    group: parse_column(0, &group_str)?,
                    daily_target: row.get(1)?,
                    updated_at: parse_datetime(&updated_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(targets)
    }

    /// Read a setting value
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write a setting value (last write wins)
    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}
