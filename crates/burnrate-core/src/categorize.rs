//! Rule-based categorization
//!
//! Rules are evaluated in priority order (lower first, then by id) and the
//! first match wins. Transactions no rule matches go to the review queue.

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::models::{CategorizationRule, PatternType};

/// Words that never make a useful merchant pattern
const STOPWORDS: &[&str] = &[
    "THE", "AND", "OR", "OF", "IN", "AT", "TO", "FOR", "LLC", "INC", "CORP", "LTD", "DES", "ID",
    "CO", "PURCHASE", "PAYMENT", "DEBIT", "CREDIT", "CARD",
];

/// The rule that categorized a description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMatch {
    pub rule_id: i64,
    pub category_id: i64,
    pub pattern: String,
}

enum Matcher {
    Contains(Vec<String>),
    Regex(Regex),
    Exact(String),
}

impl Matcher {
    fn compile(pattern: &str, pattern_type: PatternType) -> Result<Self> {
        Ok(match pattern_type {
            PatternType::Contains => Self::Contains(
                pattern
                    .split('|')
                    .map(|p| p.trim().to_uppercase())
                    .filter(|p| !p.is_empty())
                    .collect(),
            ),
            PatternType::Regex => Self::Regex(Regex::new(pattern)?),
            PatternType::Exact => Self::Exact(pattern.trim().to_uppercase()),
        })
    }

    fn is_match(&self, description: &str) -> bool {
        let desc_upper = description.to_uppercase();
        match self {
            Self::Contains(alternatives) => alternatives.iter().any(|p| desc_upper.contains(p)),
            Self::Regex(re) => re.is_match(description) || re.is_match(&desc_upper),
            Self::Exact(p) => desc_upper.trim() == p,
        }
    }
}

struct CompiledRule {
    rule: CategorizationRule,
    matcher: Matcher,
}

/// Precompiled rule set
pub struct Categorizer {
    rules: Vec<CompiledRule>,
}

impl Categorizer {
    /// Compile rules, keeping only active ones, in evaluation order
    pub fn from_rules(mut rules: Vec<CategorizationRule>) -> Result<Self> {
        rules.retain(|r| r.is_active);
        rules.sort_by_key(|r| (r.priority, r.id));

        let rules = rules
            .into_iter()
            .map(|rule| {
                let matcher = Matcher::compile(&rule.pattern, rule.pattern_type)?;
                Ok(CompiledRule { rule, matcher })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule matching `description`. Account-scoped rules only apply
    /// to their own account.
    pub fn categorize(&self, description: &str, account_id: Option<i64>) -> Option<RuleMatch> {
        self.rules
            .iter()
            .filter(|c| match c.rule.account_id {
                Some(scoped) => account_id == Some(scoped),
                None => true,
            })
            .find(|c| c.matcher.is_match(description))
            .map(|c| RuleMatch {
                rule_id: c.rule.id,
                category_id: c.rule.category_id,
                pattern: c.rule.pattern.clone(),
            })
    }
}

/// Check a single pattern against a description (rule tester)
pub fn test_pattern(pattern: &str, pattern_type: PatternType, description: &str) -> Result<bool> {
    Ok(Matcher::compile(pattern, pattern_type)?.is_match(description))
}

/// Suggest a contains-pattern from a raw bank description.
///
/// Takes the first meaningful word, or the first two when the first is
/// shorter than five characters.
pub fn suggest_pattern(description: &str) -> Option<String> {
    let words: Vec<String> = description
        .split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '&')
        .map(|w| w.to_uppercase())
        .filter(|w| w.chars().count() > 2)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect();

    let first = words.first()?;
    if first.chars().count() < 5 {
        if let Some(second) = words.get(1) {
            return Some(format!("{} {}", first, second));
        }
    }
    Some(first.clone())
}
