//! Network operations
//!
//! HTTP client shared by remote sources.

pub mod client;

// Re-export commonly used types
pub use client::HttpClient;
