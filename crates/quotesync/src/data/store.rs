//! Quote collection management
//!
//! `QuoteStore` owns the collection, writes it back to durable storage
//! after every mutation and holds the conflicts left over from sync.

use crate::config::storage::{CATEGORY_KEY, LAST_QUOTE_KEY, QUOTES_KEY};
use crate::data::storage::KeyValueStore;
use crate::data::types::{CategoryFilter, Quote};
use crate::error::{QuoteError, Result};
use crate::sync::{reconcile, Conflict, ConflictQueue, Resolution, SyncReport};
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

/// Quotes used when nothing has been persisted yet
pub fn seed_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            "The only limit to our realization of tomorrow is our doubts of today.",
            "Motivation",
        ),
        Quote::new("In the middle of every difficulty lies opportunity.", "Inspiration"),
        Quote::new(
            "Success is not final, failure is not fatal: It is the courage to continue that counts.",
            "Perseverance",
        ),
    ]
}

/// Pick one element uniformly at random, `None` if there is nothing to pick
pub fn pick_random<'a>(candidates: &[&'a Quote]) -> Option<&'a Quote> {
    candidates.choose(&mut rand::rng()).copied()
}

/// Owns the quote collection and its persisted form
pub struct QuoteStore {
    quotes: Vec<Quote>,
    selected: CategoryFilter,
    conflicts: ConflictQueue,
    durable: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
}

impl QuoteStore {
    /// Open the store, loading the persisted collection or the seed set
    pub fn open(durable: Box<dyn KeyValueStore>, session: Box<dyn KeyValueStore>) -> Result<Self> {
        let quotes = match durable.get(QUOTES_KEY)? {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(&json)?,
            _ => {
                debug!("No persisted quotes, starting from seed set");
                seed_quotes()
            }
        };

        let selected = match durable.get(CATEGORY_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("Ignoring unreadable category selection: {e}");
                CategoryFilter::All
            }),
            None => CategoryFilter::All,
        };

        Ok(Self {
            quotes,
            selected,
            conflicts: ConflictQueue::new(),
            durable,
            session,
        })
    }

    /// Write the whole collection to durable storage
    pub fn save(&self) -> Result<()> {
        self.write_quotes(&self.quotes)
    }

    fn write_quotes(&self, quotes: &[Quote]) -> Result<()> {
        let json = serde_json::to_string(quotes)?;
        self.durable.set(QUOTES_KEY, &json)?;
        debug!(count = quotes.len(), "Saved quotes");
        Ok(())
    }

    /// Persist `candidate` and only then make it the collection
    ///
    /// A failed write leaves the in-memory collection as it was.
    fn commit(&mut self, candidate: Vec<Quote>) -> Result<()> {
        self.write_quotes(&candidate)?;
        self.quotes = candidate;
        Ok(())
    }

    /// Add a local quote
    ///
    /// Both fields are trimmed; an empty field rejects the quote and
    /// leaves the collection untouched.
    pub fn add(&mut self, text: &str, category: &str) -> Result<&Quote> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() || category.is_empty() {
            return Err(QuoteError::Validation(
                "Please fill in both the quote text and the category.".to_string(),
            ));
        }

        let mut candidate = self.quotes.clone();
        candidate.push(Quote::new(text, category));
        self.commit(candidate)?;
        Ok(&self.quotes[self.quotes.len() - 1])
    }

    /// All quotes in insertion order
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Quotes passing a filter, in collection order
    pub fn quotes_in(&self, filter: &CategoryFilter) -> Vec<&Quote> {
        self.quotes.iter().filter(|q| filter.matches(q)).collect()
    }

    /// Quotes passing the selected category filter
    pub fn visible(&self) -> Vec<&Quote> {
        self.quotes_in(&self.selected)
    }

    /// Get all unique categories, sorted
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<_> = self.quotes.iter().map(|q| q.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn selected_category(&self) -> &CategoryFilter {
        &self.selected
    }

    /// Persist a new category selection
    pub fn select_category(&mut self, filter: CategoryFilter) -> Result<()> {
        self.durable.set(CATEGORY_KEY, &serde_json::to_string(&filter)?)?;
        self.selected = filter;
        Ok(())
    }

    /// Select a category and return the quotes in it
    pub fn filter_by_category(&mut self, filter: CategoryFilter) -> Result<Vec<&Quote>> {
        self.select_category(filter)?;
        Ok(self.visible())
    }

    /// Pick a random quote from the selected category and remember it
    ///
    /// `None` when the category has no quotes.
    pub fn show_random(&mut self) -> Result<Option<Quote>> {
        let Some(quote) = pick_random(&self.visible()).cloned() else {
            return Ok(None);
        };

        self.session.set(LAST_QUOTE_KEY, &quote.render())?;
        self.durable.set(LAST_QUOTE_KEY, &serde_json::to_string(&quote)?)?;
        Ok(Some(quote))
    }

    /// Rendered last viewed quote from this session
    pub fn last_viewed(&self) -> Result<Option<String>> {
        self.session.get(LAST_QUOTE_KEY)
    }

    /// Last viewed quote from any session
    pub fn last_viewed_quote(&self) -> Result<Option<Quote>> {
        match self.durable.get(LAST_QUOTE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Serialize the whole collection as pretty-printed JSON
    pub fn export_snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.quotes)?)
    }

    /// Append every quote from a JSON array
    ///
    /// No de-duplication: importing an export of this same store doubles
    /// each entry. Returns the number of quotes appended.
    pub fn import_snapshot(&mut self, payload: &str) -> Result<usize> {
        let imported: Vec<Quote> = serde_json::from_str(payload)?;
        let count = imported.len();
        let mut candidate = self.quotes.clone();
        candidate.extend(imported);
        self.commit(candidate)?;
        info!(count, "Imported quotes");
        Ok(count)
    }

    /// Merge a remote snapshot into the collection
    ///
    /// New remote quotes are appended and saved in one write. Conflicting
    /// quotes are queued for `resolve_conflict` and left untouched. Queued
    /// conflicts whose id this pass finds consistent again are dropped.
    ///
    /// Conflicts are queued even when saving the additions fails.
    pub fn sync(&mut self, remote: Vec<Quote>) -> Result<SyncReport> {
        let result = reconcile(&self.quotes, remote);
        let report = SyncReport {
            added: result.additions.len(),
            conflicts: result.conflicts.len(),
            unchanged: result.unchanged.len(),
            skipped: result.skipped,
        };

        for id in &result.unchanged {
            if self.conflicts.discard(id) {
                debug!(%id, "Dropped conflict, copies agree again");
            }
        }
        for conflict in result.conflicts {
            self.conflicts.push(conflict);
        }

        if !result.additions.is_empty() {
            let mut candidate = self.quotes.clone();
            candidate.extend(result.additions);
            self.commit(candidate)?;
        }

        info!(
            added = report.added,
            conflicts = report.conflicts,
            unchanged = report.unchanged,
            skipped = report.skipped,
            "Sync pass complete"
        );
        Ok(report)
    }

    /// The conflict awaiting a decision, if any
    pub fn pending_conflict(&self) -> Option<&Conflict> {
        self.conflicts.front()
    }

    /// Every queued conflict, next one first
    pub fn pending_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter()
    }

    pub fn pending_conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// Settle the pending conflict and return it
    ///
    /// The conflict stays queued if the resolution cannot be saved.
    pub fn resolve_conflict(&mut self, resolution: Resolution) -> Result<Conflict> {
        let remote = match self.conflicts.front() {
            Some(conflict) => &conflict.remote,
            None => return Err(QuoteError::NotFound("no pending conflict".to_string())),
        };

        if resolution == Resolution::UseRemote {
            let mut candidate = self.quotes.clone();
            match candidate.iter_mut().find(|q| q.id.is_some() && q.id == remote.id) {
                Some(local) => {
                    local.text = remote.text.clone();
                    local.category = remote.category.clone();
                }
                // Local copy vanished since the pass ran
                None => candidate.push(remote.clone()),
            }
            self.commit(candidate)?;
        }

        let conflict = self
            .conflicts
            .pop()
            .ok_or_else(|| QuoteError::NotFound("no pending conflict".to_string()))?;

        debug!(?resolution, id = ?conflict.id(), "Conflict resolved");
        Ok(conflict)
    }
}
