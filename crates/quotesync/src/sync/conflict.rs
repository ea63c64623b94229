//! Conflicts between local and remote copies of the same quote

use crate::data::types::{Quote, QuoteId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A local and a remote quote sharing an id but differing in content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub local: Quote,
    pub remote: Quote,
}

impl Conflict {
    pub fn new(local: Quote, remote: Quote) -> Self {
        Self { local, remote }
    }

    /// The shared id (taken from the remote copy, which always has one)
    pub fn id(&self) -> Option<&QuoteId> {
        self.remote.id.as_ref().or(self.local.id.as_ref())
    }
}

/// How the user settled a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Keep the local copy as is
    KeepLocal,
    /// Overwrite the local copy with the remote one
    UseRemote,
}

/// Conflicts waiting for a decision, resolved front to back
///
/// At most one entry per id: a newer conflict on an id that is already
/// queued replaces the queued one in place.
#[derive(Debug, Clone, Default)]
pub struct ConflictQueue {
    pending: VecDeque<Conflict>,
}

impl ConflictQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, conflict: Conflict) {
        let existing = self
            .pending
            .iter_mut()
            .find(|queued| queued.id().is_some() && queued.id() == conflict.id());
        match existing {
            Some(queued) => *queued = conflict,
            None => self.pending.push_back(conflict),
        }
    }

    /// Drop the queued conflict for `id`, returning whether there was one
    pub fn discard(&mut self, id: &QuoteId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|queued| queued.id() != Some(id));
        self.pending.len() != before
    }

    /// The conflict currently awaiting resolution
    pub fn front(&self) -> Option<&Conflict> {
        self.pending.front()
    }

    pub fn pop(&mut self) -> Option<Conflict> {
        self.pending.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(id: u64, local: &str, remote: &str) -> Conflict {
        Conflict::new(
            Quote::new(local, "X").with_id(id),
            Quote::new(remote, "X").with_id(id),
        )
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = ConflictQueue::new();
        queue.push(conflict(1, "A", "A2"));
        queue.push(conflict(2, "B", "B2"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().remote.text, "A2");
        assert_eq!(queue.pop().unwrap().remote.text, "B2");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_same_id_replaces_queued_entry() {
        let mut queue = ConflictQueue::new();
        queue.push(conflict(1, "A", "A2"));
        queue.push(conflict(2, "B", "B2"));
        queue.push(conflict(1, "A", "A3"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.front().unwrap().remote.text, "A3");
    }

    #[test]
    fn test_discard_by_id() {
        let mut queue = ConflictQueue::new();
        queue.push(conflict(1, "A", "A2"));
        queue.push(conflict(2, "B", "B2"));

        assert!(queue.discard(&QuoteId::from(1)));
        assert!(!queue.discard(&QuoteId::from(1)));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.front().unwrap().remote.text, "B2");
    }
}
