//! Category command implementations

use anyhow::Result;
use burnrate_core::models::{NewCategory, SpendingGroup};
use burnrate_core::Database;

use super::resolve_category;

/// Parse a group argument; "none" clears the group
fn parse_group_arg(group: &str) -> Result<Option<SpendingGroup>> {
    if group.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let group = group.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    Ok(Some(group))
}

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;

    if categories.is_empty() {
        println!("No categories found. Run 'burnrate init' to seed defaults.");
        return Ok(());
    }

    println!();
    println!("📂 Categories");
    println!("   ─────────────────────────────────────────────");

    for category in categories {
        let group = category
            .burn_rate_group
            .map(|g| g.to_string())
            .unwrap_or_else(|| "-".to_string());
        let inactive = if category.is_active { "" } else { " (inactive)" };
        println!(
            "   [{}] {:<20} {:<14} {}{}",
            category.id,
            category.name,
            group,
            category.category_type.as_str(),
            inactive
        );
    }

    Ok(())
}

pub fn cmd_categories_add(db: &Database, name: &str, group: Option<&str>) -> Result<()> {
    let burn_rate_group = match group {
        Some(g) => parse_group_arg(g)?,
        None => None,
    };

    let id = db.create_category(&NewCategory {
        name: name.to_string(),
        category_type: Default::default(),
        parent_id: None,
        burn_rate_group,
        display_order: 0,
    })?;

    db.log_audit(
        "cli",
        "create",
        Some("category"),
        Some(id),
        Some(&format!("name={}, group={:?}", name, burn_rate_group)),
    )?;

    println!("✅ Created category '{}' (id: {})", name, id);
    Ok(())
}

pub fn cmd_categories_group(db: &Database, category: &str, group: &str) -> Result<()> {
    let category = resolve_category(db, category)?;
    let group = parse_group_arg(group)?;

    db.set_category_group(category.id, group)?;

    db.log_audit(
        "cli",
        "update",
        Some("category"),
        Some(category.id),
        Some(&format!("burn_rate_group={:?}", group)),
    )?;

    match group {
        Some(g) => println!("✅ '{}' now counts toward {}", category.name, g),
        None => println!("✅ '{}' removed from burn rate tracking", category.name),
    }
    Ok(())
}

pub fn cmd_categories_delete(db: &Database, category: &str) -> Result<()> {
    let category = resolve_category(db, category)?;

    db.delete_category(category.id)?;
    db.log_audit(
        "cli",
        "delete",
        Some("category"),
        Some(category.id),
        Some(&format!("name={}", category.name)),
    )?;

    println!("✅ Deleted category '{}'", category.name);
    Ok(())
}
