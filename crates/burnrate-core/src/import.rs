//! Bank of America CSV import
//!
//! Two export layouts are supported:
//! - Credit card: `Posted Date,Reference Number,Payee,Address,Amount`
//! - Checking/savings: `Date,Description,Amount,Running Bal.`, usually
//!   preceded by a balance summary block that is skipped
//!
//! Dedup hashes are truncated SHA-256 digests. Credit card rows hash the
//! date and reference number; checking rows have no reference, so they hash
//! date, amount text and the first 50 characters of the description.

use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::categorize::Categorizer;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{CsvFormat, NewTransaction};

/// Errors reported back to the caller after an import
pub const MAX_REPORTED_ERRORS: usize = 5;

const CREDIT_CARD_COLUMNS: [&str; 5] = [
    "Posted Date",
    "Reference Number",
    "Payee",
    "Address",
    "Amount",
];
const CHECKING_COLUMNS: [&str; 4] = ["Date", "Description", "Amount", "Running Bal."];

/// One parsed CSV row, not yet categorized
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub import_hash: String,
    /// Original row as JSON
    pub original_data: String,
}

/// Rows parsed from a file plus per-row errors
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub format: Option<CsvFormat>,
    pub transactions: Vec<ParsedTransaction>,
    pub errors: Vec<String>,
}

/// Counts from one import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub format: Option<CsvFormat>,
    pub new_count: usize,
    pub duplicate_count: usize,
    /// New transactions a rule categorized
    pub categorized_count: usize,
    /// New transactions left for review
    pub review_count: usize,
    pub error_count: usize,
    /// First few row errors
    pub errors: Vec<String>,
}

/// Detect the export layout from the start of the file
pub fn detect_format(content: &str) -> CsvFormat {
    let head = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .to_lowercase();

    if head.contains("reference number") || head.contains("posted date") {
        CsvFormat::CreditCard
    } else {
        CsvFormat::Checking
    }
}

/// Read and parse an export. `format` overrides detection.
pub fn parse_reader<R: Read>(mut reader: R, format: Option<CsvFormat>) -> Result<ParseOutcome> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_csv(&content, format)
}

/// Parse export content. `format` overrides detection.
pub fn parse_csv(content: &str, format: Option<CsvFormat>) -> Result<ParseOutcome> {
    if content.trim().is_empty() {
        return Err(Error::Import("Empty file".into()));
    }

    let format = format.unwrap_or_else(|| detect_format(content));
    let records = read_records(content)?;

    let mut outcome = match format {
        CsvFormat::CreditCard => parse_credit_card(&records),
        CsvFormat::Checking => parse_checking(&records),
    };
    outcome.format = Some(format);

    debug!(
        format = %format,
        parsed = outcome.transactions.len(),
        errors = outcome.errors.len(),
        "Parsed CSV"
    );
    Ok(outcome)
}

fn read_records(content: &str) -> Result<Vec<StringRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in rdr.records() {
        records.push(result?);
    }
    Ok(records)
}

fn parse_credit_card(records: &[StringRecord]) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    // Row 1 is the header
    for (idx, record) in records.iter().enumerate().skip(1) {
        let row_number = idx + 1;
        if record.len() < 5 {
            continue;
        }

        let date_str = clean_field(&record[0]);
        // Footer rows have no date
        if date_str.is_empty() {
            continue;
        }

        let parsed = (|| -> Result<Option<ParsedTransaction>> {
            let date = parse_date(&date_str)?;
            let Some(amount_text) = clean_amount(&record[4]) else {
                return Ok(None);
            };
            let amount = parse_amount(&amount_text)?;
            let reference = clean_field(&record[1]);

            Ok(Some(ParsedTransaction {
                date,
                description: clean_field(&record[2]),
                amount,
                import_hash: truncated_hash(&format!("{}|{}", date, reference)),
                original_data: record_to_json(&CREDIT_CARD_COLUMNS, record),
            }))
        })();

        match parsed {
            Ok(Some(tx)) => outcome.transactions.push(tx),
            Ok(None) => {}
            Err(e) => outcome.errors.push(format!("Row {}: {}", row_number, e)),
        }
    }

    outcome
}

fn parse_checking(records: &[StringRecord]) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    // Skip the summary block: start after a "Date" header row, or at the
    // first row that already holds a date
    let start = records
        .iter()
        .position(|r| {
            r.len() >= 3
                && (clean_field(&r[0]).eq_ignore_ascii_case("date") || is_bofa_date(&r[0]))
        })
        .map(|i| {
            if is_bofa_date(&records[i][0]) {
                i
            } else {
                i + 1
            }
        })
        .unwrap_or(records.len());

    for (idx, record) in records.iter().enumerate().skip(start) {
        let row_number = idx + 1;
        if record.len() < 3 || !is_bofa_date(&record[0]) {
            continue;
        }
        let Some(amount_text) = clean_amount(&record[2]) else {
            continue;
        };

        let parsed = (|| -> Result<ParsedTransaction> {
            let date = parse_date(&record[0])?;
            let amount = parse_amount(&amount_text)?;
            let description = clean_field(&record[1]);
            let desc_prefix: String = description.chars().take(50).collect();

            Ok(ParsedTransaction {
                date,
                import_hash: truncated_hash(&format!("{}|{}|{}", date, amount_text, desc_prefix)),
                description,
                amount,
                original_data: record_to_json(&CHECKING_COLUMNS, record),
            })
        })();

        match parsed {
            Ok(tx) => outcome.transactions.push(tx),
            Err(e) => outcome.errors.push(format!("Row {}: {}", row_number, e)),
        }
    }

    outcome
}

/// Import an export into an account: parse, categorize, dedup, insert
pub fn ingest<R: Read>(
    db: &Database,
    account_id: i64,
    reader: R,
    format: Option<CsvFormat>,
) -> Result<ImportSummary> {
    if db.get_account(account_id)?.is_none() {
        return Err(Error::NotFound(format!("Account {}", account_id)));
    }

    let parsed = parse_reader(reader, format)?;
    let categorizer = Categorizer::from_rules(db.list_active_rules()?)?;

    let mut summary = ImportSummary {
        format: parsed.format,
        error_count: parsed.errors.len(),
        errors: parsed
            .errors
            .iter()
            .take(MAX_REPORTED_ERRORS)
            .cloned()
            .collect(),
        ..Default::default()
    };

    for tx in parsed.transactions {
        let category_id = categorizer
            .categorize(&tx.description, Some(account_id))
            .map(|m| m.category_id);

        let new_tx = NewTransaction {
            account_id,
            date: tx.date,
            description: tx.description,
            amount: tx.amount,
            import_hash: tx.import_hash,
            category_id,
            needs_review: category_id.is_none(),
            original_data: Some(tx.original_data),
        };

        match db.insert_transaction(&new_tx)? {
            Some(_) => {
                summary.new_count += 1;
                if category_id.is_some() {
                    summary.categorized_count += 1;
                } else {
                    summary.review_count += 1;
                }
            }
            None => summary.duplicate_count += 1,
        }
    }

    info!(
        account_id,
        new = summary.new_count,
        duplicates = summary.duplicate_count,
        categorized = summary.categorized_count,
        review = summary.review_count,
        "Import complete"
    );
    Ok(summary)
}

fn record_to_json(columns: &[&str], record: &StringRecord) -> String {
    let mut map = serde_json::Map::new();
    for (column, value) in columns.iter().zip(record.iter()) {
        map.insert(column.to_string(), Value::String(value.to_string()));
    }
    json!(map).to_string()
}

fn truncated_hash(data: &str) -> String {
    let digest = Sha256::digest(data.as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(32);
    hash
}

fn clean_field(s: &str) -> String {
    s.trim().trim_matches('"').trim().to_string()
}

fn is_bofa_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y").is_ok()
}

/// Strip quotes, currency symbols and separators; None when blank
fn clean_amount(s: &str) -> Option<String> {
    let cleaned = s
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .replace(['$', ',', ' '], "");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim().trim_matches('"');

    for fmt in ["%m/%d/%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse a cleaned amount, treating parentheses as negative
fn parse_amount(s: &str) -> Result<f64> {
    let normalized = s.replace('(', "-").replace(')', "");

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}
