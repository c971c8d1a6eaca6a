//! Categorization rule operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{CategorizationRule, NewRule, RuleUpdate};

const RULE_COLUMNS: &str =
    "id, pattern, pattern_type, category_id, priority, account_id, is_active, created_at";

fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<CategorizationRule> {
    let pattern_type_str: String = row.get(2)?;
    let created_at_str: String = row.get(7)?;

    Ok(CategorizationRule {
        id: row.get(0)?,
        pattern: row.get(1)?,
        pattern_type: parse_column(2, &pattern_type_str)?,
        category_id: row.get(3)?,
        priority: row.get(4)?,
        account_id: row.get(5)?,
        is_active: row.get(6)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Create a categorization rule
    pub fn create_rule(&self, rule: &NewRule) -> Result<i64> {
        if rule.pattern.trim().is_empty() {
            return Err(Error::InvalidData("Rule pattern cannot be empty".into()));
        }
        if self.get_category(rule.category_id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", rule.category_id)));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO categorization_rules (pattern, pattern_type, category_id, priority, account_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                rule.pattern.trim(),
                rule.pattern_type.as_str(),
                rule.category_id,
                rule.priority,
                rule.account_id,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all rules in evaluation order (priority, then id)
    pub fn list_rules(&self) -> Result<Vec<CategorizationRule>> {
        self.query_rules(false)
    }

    /// List active rules in evaluation order
    pub fn list_active_rules(&self) -> Result<Vec<CategorizationRule>> {
        self.query_rules(true)
    }

    fn query_rules(&self, active_only: bool) -> Result<Vec<CategorizationRule>> {
        let conn = self.conn()?;
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categorization_rules {} ORDER BY priority, id",
            RULE_COLUMNS, filter
        ))?;

        let rules = stmt
            .query_map([], rule_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rules)
    }

    /// Get a rule by ID
    pub fn get_rule(&self, id: i64) -> Result<Option<CategorizationRule>> {
        let conn = self.conn()?;
        let rule = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categorization_rules WHERE id = ?",
                    RULE_COLUMNS
                ),
                params![id],
                rule_from_row,
            )
            .optional()?;

        Ok(rule)
    }

    /// Apply a partial update to a rule
    pub fn update_rule(&self, id: i64, update: &RuleUpdate) -> Result<CategorizationRule> {
        let current = self
            .get_rule(id)?
            .ok_or_else(|| Error::NotFound(format!("Rule {}", id)))?;

        if let Some(category_id) = update.category_id {
            if self.get_category(category_id)?.is_none() {
                return Err(Error::NotFound(format!("Category {}", category_id)));
            }
        }
        if update.pattern.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(Error::InvalidData("Rule pattern cannot be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE categorization_rules
            SET pattern = ?, pattern_type = ?, category_id = ?, priority = ?, is_active = ?
            WHERE id = ?
            "#,
            params![
                update
                    .pattern
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or(current.pattern.as_str()),
                update.pattern_type.unwrap_or(current.pattern_type).as_str(),
                update.category_id.unwrap_or(current.category_id),
                update.priority.unwrap_or(current.priority),
                update.is_active.unwrap_or(current.is_active),
                id
            ],
        )?;

        self.get_rule(id)?
            .ok_or_else(|| Error::NotFound(format!("Rule {}", id)))
    }

    /// Delete a rule
    pub fn delete_rule(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM categorization_rules WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Rule {}", id)));
        }
        Ok(())
    }
}
