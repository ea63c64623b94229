//! Error types for quotesync
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for quotesync
#[derive(Error, Debug)]
pub enum QuoteError {
    /// User input rejected (empty quote text or category)
    #[error("{0}")]
    Validation(String),

    /// Malformed JSON payload (import file, persisted slot, remote body)
    #[error("Invalid JSON: {0}")]
    Parse(String),

    #[error("{}", friendly_network_error(.0))]
    Network(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for QuoteError {
    fn from(e: serde_json::Error) -> Self {
        QuoteError::Parse(e.to_string())
    }
}

/// Result type alias for quotesync
pub type Result<T> = std::result::Result<T, QuoteError>;

fn friendly_network_error(e: &reqwest::Error) -> String {
    if e.is_builder() {
        if let Some(url) = e.url() {
            return format!("Invalid URL: {url}");
        }
        return "Invalid URL".to_string();
    }
    if let Some(status) = e.status() {
        return format!("Server returned {status}");
    }
    if e.is_connect() {
        if let Some(url) = e.url() {
            return format!("Could not connect to {}", url.host_str().unwrap_or("server"));
        }
        return "Could not connect to server".to_string();
    }
    if e.is_timeout() {
        return "Connection timed out".to_string();
    }
    if e.is_decode() {
        return "Invalid response from server".to_string();
    }
    format!("Network error: {e}")
}
