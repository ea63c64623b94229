//! Shared application state and commands
//!
//! `QuoteCommand` is the command type sent by any frontend.
//! `QuoteSnapshot` is the view model frontends render.

use crate::config::ui::{ALL_CATEGORIES, NO_QUOTES_MESSAGE};
use crate::data::types::{CategoryFilter, Quote};
use crate::sync::{Conflict, Resolution};

/// Commands sent by any frontend
#[derive(Debug)]
pub enum QuoteCommand {
    /// Pick a new random quote from the selected category
    ShowRandom,
    AddQuote {
        text: String,
        category: String,
    },
    SelectCategory(CategoryFilter),
    /// Append quotes from a JSON payload
    Import(String),
    /// Fetch the remote snapshot and reconcile
    Sync,
    /// Settle the pending conflict
    ResolveConflict(Resolution),
    DismissNotice,
    Shutdown,

    // Internal: remote fetch finished on a worker thread (not sent by frontends)
    InternalSyncFetched {
        pass: u64,
        result: Result<Vec<Quote>, String>,
    },
}

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient feedback for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Snapshot of app state — shared between controller and frontends
#[derive(Clone, Debug, Default)]
pub struct QuoteSnapshot {
    /// Quote on display, `None` shows the empty-state message
    pub current: Option<Quote>,
    pub selected_category: CategoryFilter,
    /// Distinct categories in the collection (without the "all" sentinel)
    pub categories: Vec<String>,
    /// Quotes in the selected category
    pub visible: Vec<Quote>,
    pub total: usize,
    /// Conflict awaiting a decision
    pub pending_conflict: Option<Conflict>,
    /// Conflicts queued, including the pending one
    pub conflicts_queued: usize,
    /// Fetches started but not yet reconciled
    pub syncs_in_flight: usize,
    /// Completed sync passes
    pub syncs_completed: u64,
    /// Feedback from the last command, newest last
    pub notices: Vec<Notice>,
}

impl QuoteSnapshot {
    /// Text for the quote display area
    pub fn display_text(&self) -> String {
        match &self.current {
            Some(quote) => quote.render(),
            None => NO_QUOTES_MESSAGE.to_string(),
        }
    }

    /// Dropdown options: "all" followed by every category
    pub fn category_options(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.categories.iter().cloned())
            .collect()
    }

    /// Most recent notice
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncs_in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_display() {
        let snapshot = QuoteSnapshot::default();
        assert_eq!(snapshot.display_text(), NO_QUOTES_MESSAGE);
        assert!(snapshot.notice().is_none());
    }

    #[test]
    fn test_category_options_start_with_all() {
        let snapshot = QuoteSnapshot {
            categories: vec!["Inspiration".to_string(), "Motivation".to_string()],
            ..Default::default()
        };
        assert_eq!(snapshot.category_options(), vec!["all", "Inspiration", "Motivation"]);
    }
}
