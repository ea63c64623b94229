//! Local/remote reconciliation
//!
//! The pure merge pass and the conflict bookkeeping used by `QuoteStore`.

pub mod conflict;
pub mod reconcile;

pub use conflict::{Conflict, ConflictQueue, Resolution};
pub use reconcile::{reconcile, Reconciliation, SyncReport};
