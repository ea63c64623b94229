//! Remote quote sources
//!
//! Where sync passes get their remote snapshot from.

pub mod http;
pub mod traits;

// Re-exports
pub use http::HttpQuoteSource;
pub use traits::QuoteSource;
