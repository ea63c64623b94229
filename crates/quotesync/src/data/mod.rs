//! Data persistence
//!
//! Handles the quote collection, storage slots and the category filter.

pub mod storage;
pub mod store;
pub mod types;

// Re-export common types
pub use storage::{data_dir, read_text, write_text, FileStore, KeyValueStore, MemoryStore};
pub use store::{pick_random, seed_quotes, QuoteStore};
pub use types::{CategoryFilter, Quote, QuoteId};
