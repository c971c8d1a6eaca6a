//! Transaction command implementations

use anyhow::Result;
use burnrate_core::models::{NewRule, TransactionQuery, DEFAULT_RULE_PRIORITY};
use burnrate_core::{suggest_pattern, Database};

use super::{format_amount, resolve_category, truncate};

pub fn cmd_transactions_list(db: &Database, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(&TransactionQuery {
        limit: Some(limit),
        ..Default::default()
    })?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  burnrate import --file statement.csv --account Visa");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let mut flags = String::new();
        if tx.needs_review {
            flags.push_str(" ?");
        }
        if tx.is_recurring {
            flags.push_str(" ↻");
        }
        if tx.is_explosion {
            flags.push_str(" 💥");
        }

        println!(
            "   [{}] {} │ {:>10} │ {}{}",
            tx.id,
            tx.date,
            format_amount(tx.amount),
            truncate(&tx.description, 40),
            flags
        );
    }

    Ok(())
}

pub fn cmd_transactions_review(db: &Database, limit: i64) -> Result<()> {
    let transactions = db.review_queue(limit)?;

    if transactions.is_empty() {
        println!("✅ Nothing to review. Every transaction has a category.");
        return Ok(());
    }

    println!();
    println!("📝 Needs Review ({} shown)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let hint = suggest_pattern(&tx.description)
            .map(|p| format!("  (suggest: {})", p))
            .unwrap_or_default();
        println!(
            "   [{}] {} │ {:>10} │ {}{}",
            tx.id,
            tx.date,
            format_amount(tx.amount),
            truncate(&tx.description, 40),
            hint
        );
    }

    println!();
    println!("   Use 'burnrate transactions categorize <category> <ids>...' to assign them.");

    Ok(())
}

pub fn cmd_transactions_categorize(
    db: &Database,
    category: &str,
    ids: &[i64],
    create_rule: bool,
) -> Result<()> {
    if ids.is_empty() {
        anyhow::bail!("No transaction IDs given");
    }

    let category = resolve_category(db, category)?;
    let updated = db.categorize_transactions(ids, category.id)?;

    println!(
        "✅ Categorized {} transaction(s) as {}",
        updated, category.name
    );

    let mut rule_id = None;
    if create_rule {
        let pattern = db
            .get_transaction(ids[0])?
            .and_then(|tx| suggest_pattern(&tx.description))
            .ok_or_else(|| anyhow::anyhow!("Could not suggest a pattern for transaction {}", ids[0]))?;

        let id = db.create_rule(&NewRule {
            pattern: pattern.clone(),
            pattern_type: Default::default(),
            category_id: category.id,
            priority: DEFAULT_RULE_PRIORITY,
            account_id: None,
        })?;
        println!("   Created rule {} ('{}' → {})", id, pattern, category.name);
        rule_id = Some(id);
    }

    db.log_audit(
        "cli",
        "categorize",
        Some("transaction"),
        None,
        Some(&format!(
            "count={}, category_id={}, rule_id={:?}",
            updated, category.id, rule_id
        )),
    )?;

    Ok(())
}

pub fn cmd_transactions_flag(
    db: &Database,
    id: i64,
    recurring: Option<bool>,
    explosion: Option<bool>,
) -> Result<()> {
    if recurring.is_none() && explosion.is_none() {
        anyhow::bail!("Nothing to change: pass --recurring and/or --explosion");
    }

    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    db.set_transaction_flags(id, recurring, explosion)?;

    db.log_audit(
        "cli",
        "update",
        Some("transaction"),
        Some(id),
        Some(&format!("recurring={:?}, explosion={:?}", recurring, explosion)),
    )?;

    println!("✅ Updated transaction {}:", id);
    println!(
        "   {} │ ${:.2} │ {}",
        tx.date,
        tx.amount.abs(),
        truncate(&tx.description, 40)
    );
    if let Some(r) = recurring {
        println!("   Recurring: {}", r);
    }
    if let Some(e) = explosion {
        println!("   Explosion: {}", e);
    }

    Ok(())
}
