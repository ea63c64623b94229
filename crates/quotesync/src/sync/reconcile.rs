//! The merge pass
//!
//! Compares a remote snapshot against the local collection by id and
//! sorts every remote quote into "already consistent", "conflict" or
//! "new addition". Nothing here mutates; `QuoteStore::sync` applies the
//! result.

use crate::data::types::{Quote, QuoteId};
use crate::sync::conflict::Conflict;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Outcome of comparing one remote snapshot against the local collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Remote quotes with no local counterpart, in remote order
    pub additions: Vec<Quote>,
    /// Same-id pairs whose content differs, in remote order
    pub conflicts: Vec<Conflict>,
    /// Ids of remote quotes already identical locally
    pub unchanged: Vec<QuoteId>,
    /// Remote quotes that could not be reconciled (missing or repeated id)
    pub skipped: usize,
}

/// Compare `remote` against `local`
pub fn reconcile(local: &[Quote], remote: Vec<Quote>) -> Reconciliation {
    let local_by_id: HashMap<&QuoteId, &Quote> = local
        .iter()
        .filter_map(|quote| quote.id.as_ref().map(|id| (id, quote)))
        .collect();

    let mut seen: HashSet<QuoteId> = HashSet::new();
    let mut result = Reconciliation::default();

    for remote_quote in remote {
        let Some(id) = remote_quote.id.clone() else {
            warn!(text = %remote_quote.text, "Skipping remote quote without id");
            result.skipped += 1;
            continue;
        };
        if !seen.insert(id.clone()) {
            warn!(%id, "Skipping repeated remote id");
            result.skipped += 1;
            continue;
        }

        match local_by_id.get(&id) {
            Some(local_quote) if local_quote.same_content(&remote_quote) => {
                result.unchanged.push(id);
            }
            Some(local_quote) => {
                debug!(%id, "Conflict between local and remote copies");
                result
                    .conflicts
                    .push(Conflict::new((*local_quote).clone(), remote_quote));
            }
            None => result.additions.push(remote_quote),
        }
    }

    result
}

/// Summary of one applied sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Remote quotes appended to the collection
    pub added: usize,
    /// Conflicts queued for resolution
    pub conflicts: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl SyncReport {
    /// True when the pass found no conflicts
    pub fn is_clean(&self) -> bool {
        self.conflicts == 0
    }

    /// User-facing outcome lines
    ///
    /// "new quotes synced" and "no conflicts" are separate outcomes and
    /// may both appear.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if self.added > 0 {
            let noun = if self.added == 1 { "quote" } else { "quotes" };
            messages.push(format!("{} new {noun} synced from server.", self.added));
        }
        if self.is_clean() {
            messages.push("Sync complete. No conflicts found.".to_string());
        } else {
            let noun = if self.conflicts == 1 { "conflict needs" } else { "conflicts need" };
            messages.push(format!("{} {noun} your decision.", self.conflicts));
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_remote_quote_is_added() {
        let local = vec![Quote::new("A", "X").with_id(1)];
        let remote = vec![
            Quote::new("A", "X").with_id(1),
            Quote::new("B", "Y").with_id(2),
        ];

        let result = reconcile(&local, remote);

        assert!(result.conflicts.is_empty());
        assert_eq!(result.unchanged, vec![QuoteId::from(1)]);
        assert_eq!(result.additions, vec![Quote::new("B", "Y").with_id(2)]);
    }

    #[test]
    fn test_differing_text_is_conflict() {
        let local = vec![Quote::new("A", "X").with_id(1)];
        let remote = vec![Quote::new("A2", "X").with_id(1)];

        let result = reconcile(&local, remote);

        assert!(result.additions.is_empty());
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].local.text, "A");
        assert_eq!(result.conflicts[0].remote.text, "A2");
    }

    #[test]
    fn test_differing_category_is_conflict() {
        let local = vec![Quote::new("A", "X").with_id(1)];
        let remote = vec![Quote::new("A", "Z").with_id(1)];

        assert_eq!(reconcile(&local, remote).conflicts.len(), 1);
    }

    #[test]
    fn test_every_conflict_is_reported() {
        let local = vec![
            Quote::new("A", "X").with_id(1),
            Quote::new("B", "X").with_id(2),
        ];
        let remote = vec![
            Quote::new("A2", "X").with_id(1),
            Quote::new("B2", "X").with_id(2),
        ];

        let result = reconcile(&local, remote);
        let texts: Vec<_> = result.conflicts.iter().map(|c| c.remote.text.as_str()).collect();
        assert_eq!(texts, vec!["A2", "B2"]);
    }

    #[test]
    fn test_local_quotes_without_id_never_match() {
        let local = vec![Quote::new("A", "X")];
        let remote = vec![Quote::new("A", "X").with_id(1)];

        let result = reconcile(&local, remote);
        assert_eq!(result.additions.len(), 1);
    }

    #[test]
    fn test_remote_without_id_or_repeated_id_is_skipped() {
        let remote = vec![
            Quote::new("no id", "X"),
            Quote::new("first", "X").with_id(5),
            Quote::new("second", "X").with_id(5),
        ];

        let result = reconcile(&[], remote);

        assert_eq!(result.skipped, 2);
        assert_eq!(result.additions.len(), 1);
        assert_eq!(result.additions[0].text, "first");
    }

    #[test]
    fn test_report_messages() {
        let both = SyncReport { added: 2, ..Default::default() };
        assert_eq!(
            both.messages(),
            vec![
                "2 new quotes synced from server.".to_string(),
                "Sync complete. No conflicts found.".to_string(),
            ]
        );

        let conflicted = SyncReport { conflicts: 1, ..Default::default() };
        assert!(!conflicted.is_clean());
        assert_eq!(conflicted.messages(), vec!["1 conflict needs your decision.".to_string()]);
    }
}
