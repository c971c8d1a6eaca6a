//! Categorization rule command implementations

use anyhow::Result;
use burnrate_core::categorize::test_pattern;
use burnrate_core::models::{NewRule, PatternType};
use burnrate_core::{suggest_pattern, Categorizer, Database};

use super::{resolve_category, truncate};

pub fn cmd_rules_list(db: &Database) -> Result<()> {
    let rules = db.list_rules()?;

    if rules.is_empty() {
        println!("No rules defined. Add one with:");
        println!("  burnrate rules add Groceries \"WHOLE FOODS\"");
        return Ok(());
    }

    let category_names: std::collections::HashMap<i64, String> = db
        .list_categories()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    println!();
    println!("📏 Categorization Rules");
    println!("   ─────────────────────────────────────────────────────────────");

    for rule in rules {
        let category = category_names
            .get(&rule.category_id)
            .map(String::as_str)
            .unwrap_or("?");
        let scope = rule
            .account_id
            .map(|id| format!(" (account {})", id))
            .unwrap_or_default();
        let inactive = if rule.is_active { "" } else { " [inactive]" };
        println!(
            "   [{}] p{:<3} {:<8} {:<30} → {}{}{}",
            rule.id,
            rule.priority,
            rule.pattern_type.as_str(),
            truncate(&rule.pattern, 30),
            category,
            scope,
            inactive
        );
    }

    Ok(())
}

pub fn cmd_rules_add(
    db: &Database,
    category: &str,
    pattern: &str,
    pattern_type: &str,
    priority: i64,
    account_id: Option<i64>,
) -> Result<()> {
    let category = resolve_category(db, category)?;
    let pattern_type: PatternType = pattern_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    // Reject patterns that would fail at import time
    test_pattern(pattern, pattern_type, "")?;

    let id = db.create_rule(&NewRule {
        pattern: pattern.to_string(),
        pattern_type,
        category_id: category.id,
        priority,
        account_id,
    })?;

    db.log_audit(
        "cli",
        "create",
        Some("rule"),
        Some(id),
        Some(&format!(
            "pattern={}, type={}, category_id={}",
            pattern,
            pattern_type.as_str(),
            category.id
        )),
    )?;

    println!(
        "✅ Created rule {} ({} '{}' → {})",
        id,
        pattern_type.as_str(),
        pattern,
        category.name
    );
    Ok(())
}

pub fn cmd_rules_delete(db: &Database, id: i64) -> Result<()> {
    db.delete_rule(id)?;
    db.log_audit("cli", "delete", Some("rule"), Some(id), None)?;
    println!("✅ Deleted rule {}", id);
    Ok(())
}

pub fn cmd_rules_test(db: &Database, description: &str) -> Result<()> {
    let categorizer = Categorizer::from_rules(db.list_active_rules()?)?;

    match categorizer.categorize(description, None) {
        Some(m) => {
            let name = db
                .get_category(m.category_id)?
                .map(|c| c.name)
                .unwrap_or_else(|| m.category_id.to_string());
            println!(
                "✅ Matched rule {} ('{}') → {}",
                m.rule_id, m.pattern, name
            );
        }
        None => {
            println!("❌ No rule matches '{}'", description);
            if let Some(pattern) = suggest_pattern(description) {
                println!("   Suggested pattern: {}", pattern);
            }
        }
    }

    Ok(())
}

pub fn cmd_rules_suggest(description: &str) -> Result<()> {
    match suggest_pattern(description) {
        Some(pattern) => println!("{}", pattern),
        None => println!("No pattern could be suggested for '{}'", description),
    }
    Ok(())
}
