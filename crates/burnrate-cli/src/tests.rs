//! CLI command tests

use std::io::Write;

use burnrate_core::models::{CsvFormat, SpendingGroup};
use burnrate_core::{BurnRateConfig, Database};
use chrono::Local;
use clap::Parser;
use tempfile::NamedTempFile;

use crate::cli::Cli;
use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    let db = Database::in_memory().unwrap();
    db.seed_defaults(&BurnRateConfig::default()).unwrap();
    db
}

/// Write a credit card export with purchases dated today
fn write_statement() -> NamedTempFile {
    let today = Local::now().date_naive().format("%m/%d/%Y");
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "Posted Date,Reference Number,Payee,Address,Amount\n\
         {d},REF0001,WHOLE FOODS MARKET #10234,SAN JOSE CA,-42.00\n\
         {d},REF0002,NETFLIX.COM,LOS GATOS CA,-15.49\n\
         {d},REF0003,PAYMENT - THANK YOU,,500.00\n",
        d = today
    )
    .unwrap();
    file
}

// ========== Helpers ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("WHOLE FOODS MARKET", 10), "WHOLE F...");
    assert_eq!(truncate("CAFÉ CAFÉ CAFÉ", 8), "CAFÉ ...");
}

#[test]
fn test_resolve_category_by_name_and_id() {
    let db = setup_test_db();
    let by_name = commands::resolve_category(&db, "Groceries").unwrap();
    let by_id = commands::resolve_category(&db, &by_name.id.to_string()).unwrap();
    assert_eq!(by_name.id, by_id.id);

    let err = commands::resolve_category(&db, "Nope").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_cmd_init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let config = BurnRateConfig::default();

    commands::cmd_init(&path, &config, true).unwrap();
    commands::cmd_init(&path, &config, true).unwrap();

    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.list_categories().unwrap().len(), 11);
    assert_eq!(db.get_target(SpendingGroup::Food).unwrap(), Some(25.0));
}

// ========== Import ==========

#[test]
fn test_cmd_import_detects_format_and_dedups() {
    let db = setup_test_db();
    let groceries = db.find_category_by_name("Groceries").unwrap().unwrap();
    commands::cmd_rules_add(&db, "Groceries", "WHOLE FOODS", "contains", 50, None).unwrap();

    let file = write_statement();
    commands::cmd_import(&db, file.path(), "Visa", None).unwrap();

    let accounts = db.list_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].format, CsvFormat::CreditCard);

    let (total, review) = db.count_transactions().unwrap();
    assert_eq!(total, 3);
    assert_eq!(review, 2);

    let tx = db
        .list_transactions(&Default::default())
        .unwrap()
        .into_iter()
        .find(|t| t.description.contains("WHOLE FOODS"))
        .unwrap();
    assert_eq!(tx.category_id, Some(groceries.id));

    // Re-import adds nothing
    commands::cmd_import(&db, file.path(), "Visa", Some("credit_card")).unwrap();
    assert_eq!(db.count_transactions().unwrap().0, 3);
    assert_eq!(db.list_accounts().unwrap().len(), 1);
}

#[test]
fn test_cmd_import_rejects_unknown_format() {
    let db = setup_test_db();
    let file = write_statement();
    let result = commands::cmd_import(&db, file.path(), "Visa", Some("amex"));
    assert!(result.is_err());
}

#[test]
fn test_cmd_import_missing_file() {
    let db = setup_test_db();
    let result = commands::cmd_import(&db, std::path::Path::new("/nonexistent.csv"), "Visa", None);
    assert!(result.is_err());
}

// ========== Burn Rate ==========

#[test]
fn test_cmd_burn_text_and_json() {
    let db = setup_test_db();
    let config = BurnRateConfig::default();
    commands::cmd_burn(&db, &config, None, false).unwrap();
    commands::cmd_burn(&db, &config, Some(0.9), true).unwrap();
    assert!(commands::cmd_burn(&db, &config, Some(f64::NAN), false).is_err());
}

#[test]
fn test_cmd_feedback_moves_target() {
    let db = setup_test_db();
    let config = BurnRateConfig::default();

    commands::cmd_feedback(&db, &config, "food", "good").unwrap();
    assert_eq!(db.get_target(SpendingGroup::Food).unwrap(), Some(20.0));

    commands::cmd_feedback(&db, &config, "food", "bad").unwrap();
    assert_eq!(db.get_target(SpendingGroup::Food).unwrap(), Some(20.0));
    assert_eq!(db.list_feedback(Some(SpendingGroup::Food), 10).unwrap().len(), 2);
}

#[test]
fn test_cmd_feedback_rejects_explosion() {
    let db = setup_test_db();
    let config = BurnRateConfig::default();

    assert!(commands::cmd_feedback(&db, &config, "explosion", "good").is_err());
    assert!(commands::cmd_feedback(&db, &config, "food", "great").is_err());
    assert!(db.list_feedback(None, 10).unwrap().is_empty());
}

#[test]
fn test_cmd_intensity_clamps() {
    let db = setup_test_db();
    let config = BurnRateConfig::default();

    commands::cmd_intensity(&db, &config, None).unwrap();
    commands::cmd_intensity(&db, &config, Some(7.0)).unwrap();
    assert_eq!(db.get_setting("curve_intensity").unwrap().as_deref(), Some("1"));
}

// ========== Categories & Rules ==========

#[test]
fn test_cmd_categories_add_and_group() {
    let db = setup_test_db();

    commands::cmd_categories_list(&db).unwrap();
    commands::cmd_categories_add(&db, "Bakery", Some("food")).unwrap();

    let bakery = db.find_category_by_name("Bakery").unwrap().unwrap();
    assert_eq!(bakery.burn_rate_group, Some(SpendingGroup::Food));

    commands::cmd_categories_group(&db, "Bakery", "none").unwrap();
    let bakery = db.get_category(bakery.id).unwrap().unwrap();
    assert_eq!(bakery.burn_rate_group, None);

    assert!(commands::cmd_categories_group(&db, "Bakery", "rent").is_err());
    assert!(commands::cmd_categories_add(&db, "Bakery", None).is_err());

    commands::cmd_categories_delete(&db, "Bakery").unwrap();
    assert!(db.find_category_by_name("Bakery").unwrap().is_none());
    assert!(commands::cmd_categories_delete(&db, "Bakery").is_err());
}

#[test]
fn test_cmd_categories_delete_refuses_used_category() {
    let db = setup_test_db();
    let file = write_statement();
    commands::cmd_import(&db, file.path(), "Visa", None).unwrap();
    let id = db.review_queue(1).unwrap()[0].id;
    commands::cmd_transactions_categorize(&db, "Groceries", &[id], false).unwrap();

    let err = commands::cmd_categories_delete(&db, "Groceries").unwrap_err();
    assert!(err.to_string().contains("used by 1 transactions"));
}

#[test]
fn test_cmd_rules_lifecycle() {
    let db = setup_test_db();

    commands::cmd_rules_list(&db).unwrap();
    commands::cmd_rules_add(&db, "Coffee", "STARBUCKS|PEET'S", "contains", 10, None).unwrap();
    assert!(commands::cmd_rules_add(&db, "Coffee", "([", "regex", 10, None).is_err());
    assert!(commands::cmd_rules_add(&db, "Coffee", "x", "glob", 10, None).is_err());
    assert!(commands::cmd_rules_add(&db, "Nope", "x", "contains", 10, None).is_err());

    let rules = db.list_rules().unwrap();
    assert_eq!(rules.len(), 1);

    commands::cmd_rules_list(&db).unwrap();
    commands::cmd_rules_test(&db, "PEET'S COFFEE #42").unwrap();
    commands::cmd_rules_test(&db, "UNKNOWN MERCHANT").unwrap();
    commands::cmd_rules_suggest("SQ *BLUE BOTTLE COFFEE").unwrap();

    commands::cmd_rules_delete(&db, rules[0].id).unwrap();
    assert!(db.list_rules().unwrap().is_empty());
    assert!(commands::cmd_rules_delete(&db, rules[0].id).is_err());
}

// ========== Transactions ==========

#[test]
fn test_cmd_transactions_review_and_categorize() {
    let db = setup_test_db();
    let file = write_statement();
    commands::cmd_import(&db, file.path(), "Visa", None).unwrap();

    commands::cmd_transactions_list(&db, 10).unwrap();
    commands::cmd_transactions_review(&db, 10).unwrap();

    let netflix = db
        .review_queue(10)
        .unwrap()
        .into_iter()
        .find(|t| t.description.contains("NETFLIX"))
        .unwrap();

    commands::cmd_transactions_categorize(&db, "Entertainment", &[netflix.id], true).unwrap();

    let tx = db.get_transaction(netflix.id).unwrap().unwrap();
    assert!(!tx.needs_review);

    let rules = db.list_rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].pattern, "NETFLIX");

    assert!(commands::cmd_transactions_categorize(&db, "Entertainment", &[], false).is_err());
}

#[test]
fn test_cmd_transactions_flag() {
    let db = setup_test_db();
    let file = write_statement();
    commands::cmd_import(&db, file.path(), "Visa", None).unwrap();
    let id = db.review_queue(1).unwrap()[0].id;

    commands::cmd_transactions_flag(&db, id, Some(true), None).unwrap();
    let tx = db.get_transaction(id).unwrap().unwrap();
    assert!(tx.is_recurring);
    assert!(!tx.is_explosion);

    assert!(commands::cmd_transactions_flag(&db, id, None, None).is_err());
    assert!(commands::cmd_transactions_flag(&db, 9999, Some(true), None).is_err());
}

// ========== Export ==========

#[test]
fn test_cmd_export_to_file() {
    let db = setup_test_db();
    let file = write_statement();
    commands::cmd_import(&db, file.path(), "Visa", None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    commands::cmd_export(&db, Some(&out), None, None, None, None).unwrap();

    let csv = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Date,Account,Category,Description,Amount");
    assert_eq!(lines.len(), 4);
    assert!(csv.contains(",Visa,,NETFLIX.COM,-15.49"));

    // Nothing is categorized yet
    commands::cmd_export(&db, Some(&out), None, None, None, Some("Groceries")).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap().lines().count(), 1);

    assert!(commands::cmd_export(&db, None, Some("01/02/2024"), None, None, None).is_err());
    assert!(commands::cmd_export(&db, None, None, None, None, Some("Nope")).is_err());
}

// ========== Status & Password ==========

#[test]
fn test_cmd_status_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.db");
    commands::cmd_status(&path, true).unwrap();

    commands::cmd_init(&path, &BurnRateConfig::default(), true).unwrap();
    commands::cmd_status(&path, true).unwrap();
}

#[test]
fn test_cmd_hash_password() {
    commands::cmd_hash_password("hunter2").unwrap();
    assert!(commands::cmd_hash_password("").is_err());
}

// ========== Dispatch ==========

#[tokio::test]
async fn test_broken_config_only_blocks_engine_commands() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("dispatch.db");
    let config = dir.path().join("engine.toml");
    std::fs::write(&config, "[decay]\nresponsive_half_life = nan\n").unwrap();

    let args = |command: &[&str]| {
        let mut argv: Vec<String> = vec![
            "burnrate".into(),
            "--no-encrypt".into(),
            "--db".into(),
            db.display().to_string(),
            "--config".into(),
            config.display().to_string(),
        ];
        argv.extend(command.iter().map(|arg| arg.to_string()));
        Cli::parse_from(argv)
    };

    crate::run(args(&["status"])).await.unwrap();
    crate::run(args(&["hash-password", "hunter2"])).await.unwrap();

    let err = crate::run(args(&["burn"])).await.unwrap_err();
    assert!(err.to_string().contains("engine configuration"));
    assert!(crate::run(args(&["init"])).await.is_err());
}
