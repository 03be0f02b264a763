use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Case- and spacing-insensitive form of a description or category name.
/// Stored alongside the original text so lookups work for non-ASCII scripts.
pub fn match_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
    /// `None` for global categories.
    pub owner: Option<String>,
}

impl Category {
    pub fn is_global(&self) -> bool {
        self.owner.is_none()
    }

    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Lightweight pointer to a category carried by drafts and resolutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

/// Which resolution tier (or the user) produced a draft's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategorySource {
    #[default]
    None,
    History,
    TrainedExact,
    Classifier,
    Manual,
}

impl CategorySource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::History => "history",
            Self::TrainedExact => "trained",
            Self::Classifier => "classifier",
            Self::Manual => "manual",
        }
    }
}

/// How an amount written without `+`/`-` is signed. The free-text entry
/// channel and the file import channel default differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsignedAmountPolicy {
    /// Unsigned amounts are expenses (negative).
    EntryDefaultExpense,
    /// Unsigned amounts are income (positive).
    ImportDefaultIncome,
}

impl UnsignedAmountPolicy {
    pub fn apply(&self, magnitude: Decimal) -> Decimal {
        match self {
            Self::EntryDefaultExpense => -magnitude.abs(),
            Self::ImportDefaultIncome => magnitude.abs(),
        }
    }
}

/// Unpersisted candidate ledger row produced by parsing, shown for review
/// before confirmation. Serialized as the proposal payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntry {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub category_source: CategorySource,
    #[serde(default)]
    pub confidence: f64,
    /// Category name given by an imported file, resolved before the tiers run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_hint: Option<String>,
}

impl DraftEntry {
    pub fn new(date: NaiveDate, amount: Decimal, description: String) -> Self {
        Self {
            date,
            amount,
            description,
            category: None,
            category_source: CategorySource::None,
            confidence: 0.0,
            category_hint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    pub id: i64,
    pub owner: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub category: Option<CategoryRef>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct LabeledExample {
    pub id: i64,
    pub text: String,
    pub category_id: i64,
    pub owner: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
}
