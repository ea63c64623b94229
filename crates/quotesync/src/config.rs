//! Configuration constants for quotesync

/// Application metadata
pub mod app {
    /// Application name (used for the data directory, etc.)
    pub const NAME: &str = "quotesync";
}

/// Storage slot names and defaults
pub mod storage {
    /// Durable slot holding the serialized quote collection
    pub const QUOTES_KEY: &str = "quotes";

    /// Slot holding the last viewed quote (durable: JSON quote, session: rendered text)
    pub const LAST_QUOTE_KEY: &str = "lastQuote";

    /// Durable slot holding the selected category filter
    pub const CATEGORY_KEY: &str = "selectedCategory";

    /// File extension used by the file-backed store
    pub const SLOT_EXTENSION: &str = "json";

    /// Default export file name
    pub const EXPORT_FILE: &str = "quotes.json";
}

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("quotesync/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Total request timeout in seconds
    pub const READ_TIMEOUT_SECS: u64 = 30;

    /// Default remote quote endpoint (serves posts, see `SERVER_CATEGORY`)
    pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

    /// Category given to remote records that carry a `title` instead of quote fields
    pub const SERVER_CATEGORY: &str = "Server";
}

/// Sync and controller configuration
pub mod sync {
    /// Default interval for periodic sync in interactive sessions (seconds)
    pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

    /// How long the controller blocks waiting for a command before polling timers (ms)
    pub const COMMAND_POLL_MS: u64 = 50;

    /// Capacity of the controller command channel
    pub const COMMAND_CHANNEL_CAPACITY: usize = 64;
}

/// Text shown when there is nothing to display
pub mod ui {
    /// Empty-state message for random selection
    pub const NO_QUOTES_MESSAGE: &str = "No quotes available. Please add some!";

    /// Sentinel category value meaning "no filter"
    pub const ALL_CATEGORIES: &str = "all";
}
