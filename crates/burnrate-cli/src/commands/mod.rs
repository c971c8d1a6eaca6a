//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `burn` - Burn rate curves, feedback and the intensity dial
//! - `categories` - Category listing and group assignment
//! - `core` - Init and shared utilities (open_db, resolve_category)
//! - `export` - CSV export
//! - `import` - CSV import
//! - `rules` - Categorization rule commands
//! - `serve` - Web server and password hashing
//! - `status` - Database status
//! - `transactions` - Transaction listing, review and categorization

pub mod burn;
pub mod categories;
pub mod core;
pub mod export;
pub mod import;
pub mod rules;
pub mod serve;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use burn::*;
pub use categories::*;
pub use core::*;
pub use export::*;
pub use import::*;
pub use rules::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount with red for expenses and green for income
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[31m${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m+${:.2}\x1b[0m", amount)
    }
}
