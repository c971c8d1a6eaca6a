//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Burn Rate - See how fast you are spending
#[derive(Parser)]
#[command(name = "burnrate")]
#[command(about = "Self-hosted spending burn rate tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "burnrate.db", global = true)]
    pub db: PathBuf,

    /// Engine configuration file (TOML)
    ///
    /// Defaults to the per-user config file when present, else built-in values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set BURNRATE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Import a Bank of America CSV export
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Account name (created if missing)
        #[arg(short, long)]
        account: String,

        /// CSV layout: credit_card or checking (auto-detected if not specified)
        #[arg(long)]
        format: Option<String>,
    },

    /// Show burn rate curves for every group
    Burn {
        /// Curve intensity between 0 (gentle) and 1 (responsive)
        #[arg(short, long)]
        intensity: Option<f64>,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Tell the engine whether the current burn rate feels right
    Feedback {
        /// Spending group: food or discretionary
        group: String,

        /// good or bad
        sentiment: String,
    },

    /// Show or set the stored curve intensity
    Intensity {
        /// New value; clamped to [0, 1]
        value: Option<f64>,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Manage categorization rules (list, add, delete, test, suggest)
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// Manage transactions (list, review, categorize, flag)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Export transactions to CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only this account ID
        #[arg(long)]
        account: Option<i64>,

        /// Only this category (name or ID)
        #[arg(long)]
        category: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show database status (encryption, size, counts)
    Status,

    /// Hash a login password for BURNRATE_PASSWORD_HASH
    HashPassword {
        /// Password to hash
        password: String,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories and their burn rate groups
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Burn rate group: food, discretionary or explosion
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Move a category into a burn rate group
    Group {
        /// Category name or ID
        category: String,

        /// Group name, or "none" to remove it from burn rate tracking
        group: String,
    },

    /// Delete a category no transaction uses (its rules and budgets go too)
    Delete {
        /// Category name or ID
        category: String,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List all rules in evaluation order
    List,

    /// Add a categorization rule
    Add {
        /// Category name or ID
        category: String,

        /// Pattern to match against transaction descriptions
        pattern: String,

        /// Pattern type: contains, regex, exact
        #[arg(short = 't', long, default_value = "contains")]
        pattern_type: String,

        /// Priority (lower runs first)
        #[arg(short, long, default_value = "50")]
        priority: i64,

        /// Only apply the rule to this account ID
        #[arg(long)]
        account: Option<i64>,
    },

    /// Delete a rule
    Delete {
        /// Rule ID
        id: i64,
    },

    /// Show which rule would categorize a description
    Test {
        /// Transaction description to test
        description: String,
    },

    /// Suggest a pattern for a description
    Suggest {
        /// Transaction description
        description: String,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// List transactions waiting for a category
    Review {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Assign a category to one or more transactions
    Categorize {
        /// Category name or ID
        category: String,

        /// Transaction IDs
        #[arg(required = true)]
        ids: Vec<i64>,

        /// Also create a rule from the first transaction's description
        #[arg(long)]
        create_rule: bool,
    },

    /// Mark a transaction as recurring or as an explosion
    Flag {
        /// Transaction ID
        id: i64,

        /// Recurring: true or false
        #[arg(long)]
        recurring: Option<bool>,

        /// Explosion (one-off large purchase): true or false
        #[arg(long)]
        explosion: Option<bool>,
    },
}
