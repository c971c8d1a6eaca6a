//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `accounts` - Bank account operations
//! - `budgets` - Monthly category budgets
//! - `categories` - Categories and spending group membership
//! - `transactions` - Transaction CRUD, review queue, burn rate pools
//! - `rules` - Categorization rules
//! - `targets` - Group targets and key/value settings
//! - `feedback` - Burn rate feedback log
//! - `reports` - Dashboard rollups
//! - `audit` - API access audit log
//! - `store` - [`BurnRateStore`](crate::burn::BurnRateStore) implementation

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::info;

use crate::burn::INTENSITY_SETTING;
use crate::config::BurnRateConfig;
use crate::error::{Error, Result};
use crate::models::{CategoryType, SpendingGroup};

mod accounts;
mod audit;
mod budgets;
mod categories;
mod feedback;
mod reports;
mod rules;
mod store;
mod targets;
mod transactions;

pub use audit::AuditEntry;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "BURNRATE_DB_KEY";

/// Categories created by `seed_defaults`
const DEFAULT_CATEGORIES: &[(&str, CategoryType, Option<SpendingGroup>)] = &[
    ("Groceries", CategoryType::Expense, Some(SpendingGroup::Food)),
    ("Restaurants", CategoryType::Expense, Some(SpendingGroup::Food)),
    ("Coffee", CategoryType::Expense, Some(SpendingGroup::Food)),
    ("Shopping", CategoryType::Expense, Some(SpendingGroup::Discretionary)),
    ("Entertainment", CategoryType::Expense, Some(SpendingGroup::Discretionary)),
    ("Travel", CategoryType::Expense, Some(SpendingGroup::Discretionary)),
    ("Large Purchases", CategoryType::Expense, Some(SpendingGroup::Explosion)),
    ("Housing", CategoryType::Expense, None),
    ("Utilities", CategoryType::Expense, None),
    ("Income", CategoryType::Income, None),
    ("Transfers", CategoryType::Transfer, None),
];

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Fixed application salt - changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"burnrate-salt-v1";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a stored `YYYY-MM-DD` date column
pub(crate) fn parse_date_column(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Convert a stored text value into a typed column, surfacing parse failures
/// as rusqlite conversion errors
pub(crate) fn parse_column<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

/// Database wrapper with connection pooling
///
/// Cloning is cheap; each operation checks a connection out of the pool
/// and returns it when the call completes.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    db_path: String,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `BURNRATE_DB_KEY` to be set. Use `new_unencrypted()` for
    /// development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Key must be set on every new connection
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "burnrate_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().into_owned();

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Seed default categories, group targets and the intensity setting
    ///
    /// Safe to run repeatedly; existing rows are left untouched.
    pub fn seed_defaults(&self, config: &BurnRateConfig) -> Result<()> {
        let conn = self.conn()?;

        for (order, (name, category_type, group)) in DEFAULT_CATEGORIES.iter().enumerate() {
            conn.execute(
                r#"
                INSERT OR IGNORE INTO categories (name, category_type, burn_rate_group, display_order)
                VALUES (?, ?, ?, ?)
                "#,
                params![
                    name,
                    category_type.as_str(),
                    group.map(|g| g.as_str()),
                    order as i64
                ],
            )?;
        }

        for group in SpendingGroup::ALL.into_iter().filter(|g| g.is_adaptive()) {
            conn.execute(
                "INSERT OR IGNORE INTO group_targets (burn_rate_group, daily_target) VALUES (?, ?)",
                params![group.as_str(), config.default_target(group)],
            )?;
        }

        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)",
            params![INTENSITY_SETTING, config.default_intensity.to_string()],
        )?;

        info!("Default categories and targets seeded");
        Ok(())
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Accounts (bank accounts)
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                format TEXT NOT NULL,                      -- credit_card, checking
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(name, format)
            );

            -- Categories
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                category_type TEXT NOT NULL DEFAULT 'expense', -- income, expense, transfer
                parent_id INTEGER REFERENCES categories(id),
                burn_rate_group TEXT,                      -- food, discretionary, explosion
                display_order INTEGER NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_categories_group ON categories(burn_rate_group);

            -- Transactions
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                account_id INTEGER NOT NULL REFERENCES accounts(id),
                date DATE NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                category_id INTEGER REFERENCES categories(id),
                needs_review BOOLEAN NOT NULL DEFAULT 0,
                is_recurring BOOLEAN NOT NULL DEFAULT 0,
                is_explosion BOOLEAN NOT NULL DEFAULT 0,
                import_hash TEXT NOT NULL UNIQUE,
                original_data TEXT,                        -- JSON of original CSV row
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
            CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_review ON transactions(needs_review);

            -- Categorization rules
            CREATE TABLE IF NOT EXISTS categorization_rules (
                id INTEGER PRIMARY KEY,
                pattern TEXT NOT NULL,
                pattern_type TEXT NOT NULL DEFAULT 'contains',
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                priority INTEGER NOT NULL DEFAULT 50,      -- lower runs first
                account_id INTEGER REFERENCES accounts(id) ON DELETE CASCADE,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_rules_priority ON categorization_rules(priority, id);

            -- Daily spending target per adaptive group
            CREATE TABLE IF NOT EXISTS group_targets (
                burn_rate_group TEXT PRIMARY KEY,
                daily_target REAL NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Key/value settings (curve_intensity, ...)
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Burn rate feedback (append-only)
            CREATE TABLE IF NOT EXISTS burn_feedback (
                id INTEGER PRIMARY KEY,
                burn_rate_group TEXT NOT NULL,
                date DATE NOT NULL,
                sentiment TEXT NOT NULL,                   -- good, bad
                rate_at_feedback REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_burn_feedback_group ON burn_feedback(burn_rate_group, date);

            -- Monthly budgets per category
            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                monthly_amount REAL NOT NULL,
                month TEXT NOT NULL,                       -- YYYY-MM
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(category_id, month)
            );

            -- Audit log (tracks API access)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                actor TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_type TEXT,
                entity_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp ON audit_log(timestamp);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
