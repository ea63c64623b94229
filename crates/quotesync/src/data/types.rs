//! Common data types for persistence
//!
//! The quote record and the category filter shared across the crate.

use crate::config::ui::ALL_CATEGORIES;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// QuoteId - Identifier assigned by a remote source
// =============================================================================

/// Identifier of a quote obtained from a remote source
///
/// Remote endpoints hand out either numeric or string ids. The two forms
/// are kept apart: `Number(1)` and `Text("1")` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteId {
    Number(u64),
    Text(String),
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteId::Number(n) => write!(f, "{n}"),
            QuoteId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for QuoteId {
    fn from(n: u64) -> Self {
        QuoteId::Number(n)
    }
}

impl From<&str> for QuoteId {
    fn from(s: &str) -> Self {
        QuoteId::Text(s.to_string())
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A quote with its category
///
/// Locally created quotes carry no id. Extra fields in incoming JSON are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuoteId>,
    pub text: String,
    pub category: String,
}

impl Quote {
    /// Create a local quote (no id)
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            category: category.into(),
        }
    }

    /// Attach a remote id
    pub fn with_id(mut self, id: impl Into<QuoteId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// True when text and category are identical (ids are not compared)
    pub fn same_content(&self, other: &Quote) -> bool {
        self.text == other.text && self.category == other.category
    }

    /// Render the quote for display
    pub fn render(&self) -> String {
        format!("\"{}\" — {}", self.text, self.category)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// =============================================================================
// CategoryFilter
// =============================================================================

/// Category selection: everything, or one named category
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Check if a quote passes this filter (exact category match)
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => quote.category == *name,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Named(name) => name,
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(s: String) -> Self {
        if s == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(s)
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        CategoryFilter::from(s.to_string())
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Named(name) => name,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CategoryFilter::from(s))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
