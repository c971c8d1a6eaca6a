//! Category operations and spending group membership

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, CategoryUpdate, NewCategory, SpendingGroup};

const CATEGORY_COLUMNS: &str = "id, name, category_type, parent_id, burn_rate_group, display_order, is_active, created_at";

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    let type_str: String = row.get(2)?;
    let group_str: Option<String> = row.get(4)?;
    let created_at_str: String = row.get(7)?;

    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        category_type: parse_column(2, &type_str)?,
        parent_id: row.get(3)?,
        burn_rate_group: group_str.map(|g| parse_column(4, &g)).transpose()?,
        display_order: row.get(5)?,
        is_active: row.get(6)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Create a category. Names are unique.
    pub fn create_category(&self, category: &NewCategory) -> Result<i64> {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Category name cannot be empty".into()));
        }

        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::InvalidData(format!(
                "Category '{}' already exists",
                name
            )));
        }

        if let Some(parent_id) = category.parent_id {
            if self.get_category(parent_id)?.is_none() {
                return Err(Error::NotFound(format!("Category {}", parent_id)));
            }
        }

        conn.execute(
            r#"
            INSERT INTO categories (name, category_type, parent_id, burn_rate_group, display_order)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                name,
                category.category_type.as_str(),
                category.parent_id,
                category.burn_rate_group.map(|g| g.as_str()),
                category.display_order,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all categories in display order
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories ORDER BY display_order, name",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
                params![id],
                category_from_row,
            )
            .optional()?;

        Ok(category)
    }

    /// Find a category by name (case-insensitive)
    pub fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categories WHERE name = ? COLLATE NOCASE",
                    CATEGORY_COLUMNS
                ),
                params![name.trim()],
                category_from_row,
            )
            .optional()?;

        Ok(category)
    }

    /// Apply a partial update to a category
    pub fn update_category(&self, id: i64, update: &CategoryUpdate) -> Result<Category> {
        let current = self
            .get_category(id)?
            .ok_or_else(|| Error::NotFound(format!("Category {}", id)))?;

        let name = match &update.name {
            Some(name) if name.trim().is_empty() => {
                return Err(Error::InvalidData("Category name cannot be empty".into()))
            }
            Some(name) => name.trim().to_string(),
            None => current.name,
        };

        let conn = self.conn()?;

        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM categories WHERE name = ? AND id != ?",
                params![name, id],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(Error::InvalidData(format!(
                "Category '{}' already exists",
                name
            )));
        }

        conn.execute(
            "UPDATE categories SET name = ?, display_order = ?, is_active = ? WHERE id = ?",
            params![
                name,
                update.display_order.unwrap_or(current.display_order),
                update.is_active.unwrap_or(current.is_active),
                id
            ],
        )?;

        self.get_category(id)?
            .ok_or_else(|| Error::NotFound(format!("Category {}", id)))
    }

    /// Assign a category to a spending group, or remove it from any group
    pub fn set_category_group(&self, id: i64, group: Option<SpendingGroup>) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE categories SET burn_rate_group = ? WHERE id = ?",
            params![group.map(|g| g.as_str()), id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Category {}", id)));
        }
        Ok(())
    }

    /// Delete a category that no transaction or subcategory refers to.
    ///
    /// Its rules and budgets go with it.
    pub fn delete_category(&self, id: i64) -> Result<()> {
        if self.get_category(id)?.is_none() {
            return Err(Error::NotFound(format!("Category {}", id)));
        }

        let mut conn = self.conn()?;

        let in_use: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE category_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        if in_use > 0 {
            return Err(Error::InvalidData(format!(
                "Category is used by {} transactions",
                in_use
            )));
        }

        let children: i64 = conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE parent_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        if children > 0 {
            return Err(Error::InvalidData(format!(
                "Category has {} subcategories",
                children
            )));
        }

        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM categorization_rules WHERE category_id = ?",
            params![id],
        )?;
        tx.execute("DELETE FROM budgets WHERE category_id = ?", params![id])?;
        tx.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        tx.commit()?;

        Ok(())
    }

    /// IDs of active categories in a spending group
    pub fn list_category_ids(&self, group: SpendingGroup) -> Result<Vec<i64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM categories WHERE burn_rate_group = ? AND is_active = 1 ORDER BY id",
        )?;

        let ids = stmt
            .query_map(params![group.as_str()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;

        Ok(ids)
    }
}
