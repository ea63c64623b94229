//! quotesync — quote collection engine
//!
//! Local persistence, random selection, JSON export/import and
//! reconciliation against a remote quote endpoint.
//!
//! ## Quick start
//!
//! ```no_run
//! use quotesync::data::{FileStore, MemoryStore, QuoteStore};
//!
//! let durable = FileStore::default_location()?;
//! let mut store = QuoteStore::open(Box::new(durable), Box::new(MemoryStore::new()))?;
//! store.add("Stay hungry, stay foolish.", "Inspiration")?;
//! # Ok::<(), quotesync::error::QuoteError>(())
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod network;
pub mod remote;
pub mod sync;
