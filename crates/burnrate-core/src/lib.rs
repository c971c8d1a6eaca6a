//! Burn Rate Core Library
//!
//! Shared functionality for the Burn Rate personal finance tool:
//! - Database access and migrations
//! - Bank of America CSV import with deduplication
//! - Rule-based categorization
//! - Budgets, dashboard rollups and CSV export
//! - Burn rate curve engine (decay weighting, curve shape, target adaptation)
//! - Engine configuration

pub mod burn;
pub mod categorize;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod models;

pub use burn::{BurnRateEngine, BurnRateStore, FeedbackOutcome, GroupBurnRate, PoolFilter};
pub use categorize::{suggest_pattern, Categorizer, RuleMatch};
pub use config::BurnRateConfig;
pub use db::{AuditEntry, Database};
pub use error::{Error, Result};
pub use export::{ExportOptions, ExportRow};
pub use import::{ingest, ImportSummary};
