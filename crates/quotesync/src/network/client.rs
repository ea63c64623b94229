//! Shared HTTP client wrapper
//!
//! Thin wrapper around `reqwest::blocking::Client` that centralizes
//! USER_AGENT and timeout configuration.

use crate::config::network::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, USER_AGENT};
use crate::error::Result;
use reqwest::blocking::ClientBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Shared HTTP client with standard configuration
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a new client honoring system proxy settings
    pub fn new() -> Result<Self> {
        Ok(Self {
            inner: Self::builder().build()?,
        })
    }

    /// Create a client that ignores proxy environment variables
    pub fn direct() -> Result<Self> {
        Ok(Self {
            inner: Self::builder().no_proxy().build()?,
        })
    }

    fn builder() -> ClientBuilder {
        reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
    }

    /// GET a URL and deserialize the JSON response
    ///
    /// Non-success status codes are errors.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.inner.get(url).send()?.error_for_status()?;
        let data = resp.json::<T>()?;
        Ok(data)
    }
}
