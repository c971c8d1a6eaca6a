//! Domain models for Burn Rate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub format: CsvFormat,
    pub created_at: DateTime<Utc>,
}

/// Bank of America export layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsvFormat {
    /// `Posted Date,Reference Number,Payee,Address,Amount`
    CreditCard,
    /// `Date,Description,Amount,Running Bal.` with a summary preamble
    Checking,
}

impl CsvFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Checking => "checking",
        }
    }
}

impl std::str::FromStr for CsvFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit_card" | "credit" | "cc" => Ok(Self::CreditCard),
            "checking" | "debit" => Ok(Self::Checking),
            _ => Err(format!("Unknown CSV format: {}", s)),
        }
    }
}

impl std::fmt::Display for CsvFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    pub category_id: Option<i64>,
    /// Set when no rule matched on import
    pub needs_review: bool,
    /// Recurring bills are left out of burn rate pools
    pub is_recurring: bool,
    /// One-off large purchases, tracked in the explosion group only
    pub is_explosion: bool,
    /// Hash for deduplication
    pub import_hash: String,
    pub created_at: DateTime<Utc>,
}

/// New transaction for insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub import_hash: String,
    pub category_id: Option<i64>,
    pub needs_review: bool,
    /// Original CSV row as JSON
    pub original_data: Option<String>,
}

/// Filter for listing transactions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub needs_review: Option<bool>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Category type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    #[default]
    Expense,
    Transfer,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("Unknown category type: {}", s)),
        }
    }
}

/// Coarse partition of categories, each with its own burn rate curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingGroup {
    Food,
    Discretionary,
    /// One-off large purchases; no target, no feedback
    Explosion,
}

impl SpendingGroup {
    pub const ALL: [SpendingGroup; 3] = [Self::Food, Self::Discretionary, Self::Explosion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Discretionary => "discretionary",
            Self::Explosion => "explosion",
        }
    }

    /// Groups that carry a target and accept feedback
    pub fn is_adaptive(&self) -> bool {
        !matches!(self, Self::Explosion)
    }
}

impl std::str::FromStr for SpendingGroup {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "food" => Ok(Self::Food),
            "discretionary" => Ok(Self::Discretionary),
            "explosion" => Ok(Self::Explosion),
            _ => Err(format!("Unknown spending group: {}", s)),
        }
    }
}

impl std::fmt::Display for SpendingGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: CategoryType,
    pub parent_id: Option<i64>,
    pub burn_rate_group: Option<SpendingGroup>,
    pub display_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// New category for insertion
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub category_type: CategoryType,
    pub parent_id: Option<i64>,
    pub burn_rate_group: Option<SpendingGroup>,
    #[serde(default)]
    pub display_order: i64,
}

/// Partial update for a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub display_order: Option<i64>,
    pub is_active: Option<bool>,
}

/// Pattern type for categorization rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Case-insensitive substring match, `|` separates alternatives
    #[default]
    Contains,
    /// Regular expression match
    Regex,
    /// Case-insensitive exact match
    Exact,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Regex => "regex",
            Self::Exact => "exact",
        }
    }
}

impl std::str::FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" => Ok(Self::Contains),
            "regex" => Ok(Self::Regex),
            "exact" => Ok(Self::Exact),
            _ => Err(format!("Unknown pattern type: {}", s)),
        }
    }
}

/// A rule mapping description patterns to a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizationRule {
    pub id: i64,
    pub pattern: String,
    pub pattern_type: PatternType,
    pub category_id: i64,
    /// Lower runs first
    pub priority: i64,
    /// Restrict the rule to one account
    pub account_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// New rule for insertion
#[derive(Debug, Clone, Deserialize)]
pub struct NewRule {
    pub pattern: String,
    #[serde(default)]
    pub pattern_type: PatternType,
    pub category_id: i64,
    #[serde(default = "default_rule_priority")]
    pub priority: i64,
    pub account_id: Option<i64>,
}

/// Priority given to rules created without one
pub const DEFAULT_RULE_PRIORITY: i64 = 50;

fn default_rule_priority() -> i64 {
    DEFAULT_RULE_PRIORITY
}

/// Partial update for a rule
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleUpdate {
    pub pattern: Option<String>,
    pub pattern_type: Option<PatternType>,
    pub category_id: Option<i64>,
    pub priority: Option<i64>,
    pub is_active: Option<bool>,
}

/// User reaction to the current burn rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Good,
    Bad,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
        }
    }
}

impl std::str::FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            _ => Err(format!("Sentiment must be 'good' or 'bad', got '{}'", s)),
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only feedback log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub group: SpendingGroup,
    pub date: NaiveDate,
    pub sentiment: Sentiment,
    pub rate_at_feedback: f64,
}

/// Stored feedback record
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackEntry {
    pub id: i64,
    #[serde(flatten)]
    pub record: FeedbackRecord,
    pub created_at: DateTime<Utc>,
}

/// Persisted daily target for a group
#[derive(Debug, Clone, Serialize)]
pub struct GroupTarget {
    pub group: SpendingGroup,
    pub daily_target: f64,
    pub updated_at: DateTime<Utc>,
}

/// Monthly budget for a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category_id: i64,
    pub monthly_amount: f64,
    /// `YYYY-MM`
    pub month: String,
    pub created_at: DateTime<Utc>,
}

/// Budget to create, or replace for the same category and month
#[derive(Debug, Clone, Deserialize)]
pub struct NewBudget {
    pub category_id: i64,
    pub monthly_amount: f64,
    /// Any day in the budget's month
    pub effective_date: NaiveDate,
}

/// Budget with the month's actual spending
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub budget_amount: f64,
    pub budget_month: String,
    pub actual_spent: f64,
    pub remaining: f64,
    pub percent_used: f64,
}

/// Date range a report covers
#[derive(Debug, Clone, Serialize)]
pub struct ReportPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Sum of every transaction amount
    pub net_worth: f64,
    /// Net amount over the period
    pub net_change: f64,
    pub spending: f64,
    /// Spending over the same-length period just before
    pub previous_spending: f64,
    pub top_category: Option<String>,
    pub top_category_amount: f64,
    pub pending_review_count: i64,
}

/// Spending in one category over a period
#[derive(Debug, Clone, Serialize)]
pub struct CategorySpending {
    pub category_id: i64,
    pub category_name: String,
    pub amount: f64,
    pub percentage: f64,
}

/// Income and expenses for one calendar month
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTotals {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

/// Dashboard rollup
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub period: ReportPeriod,
    pub summary: DashboardSummary,
    pub spending_by_category: Vec<CategorySpending>,
    pub monthly_trend: Vec<MonthlyTotals>,
    pub recent_transactions: Vec<Transaction>,
}
