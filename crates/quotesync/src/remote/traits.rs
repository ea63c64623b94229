//! Quote source trait
//!
//! Defines the interface every remote snapshot provider implements.

use crate::data::types::Quote;
use crate::error::Result;

/// A read-only source of remote quotes
///
/// `fetch` may block; the controller calls it off its own thread.
pub trait QuoteSource: Send + Sync {
    /// Display name for the source (e.g., "HTTP")
    fn name(&self) -> &str;

    /// Fetch the full remote snapshot
    fn fetch(&self) -> Result<Vec<Quote>>;
}
