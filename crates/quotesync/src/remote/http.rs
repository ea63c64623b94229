//! HTTP quote source
//!
//! GETs a JSON array from a fixed URL. Entries are either quotes
//! (`text` + `category`) or posts (`title`), as served by the default
//! placeholder endpoint.

use crate::config::network::SERVER_CATEGORY;
use crate::data::types::{Quote, QuoteId};
use crate::error::Result;
use crate::network::HttpClient;

use super::traits::QuoteSource;

use serde::Deserialize;
use tracing::debug;

/// One entry of the remote array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteRecord {
    Quote(Quote),
    Post {
        #[serde(default)]
        id: Option<QuoteId>,
        title: String,
    },
}

impl From<RemoteRecord> for Quote {
    fn from(record: RemoteRecord) -> Self {
        match record {
            RemoteRecord::Quote(quote) => quote,
            RemoteRecord::Post { id, title } => Quote {
                id,
                text: title,
                category: SERVER_CATEGORY.to_string(),
            },
        }
    }
}

/// Remote quotes served as a JSON array over HTTP
pub struct HttpQuoteSource {
    client: HttpClient,
    url: String,
}

impl HttpQuoteSource {
    /// Create a source reusing an existing client
    pub fn with_client(client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl QuoteSource for HttpQuoteSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Vec<Quote>> {
        debug!(url = %self.url, "Fetching remote quotes");
        let records: Vec<RemoteRecord> = self.client.get_json(&self.url)?;
        let quotes: Vec<Quote> = records.into_iter().map(Quote::from).collect();
        debug!(count = quotes.len(), "Fetched remote quotes");
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuoteError;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve a single HTTP response on an ephemeral port, return its URL
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            // Drain request headers
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        });

        format!("http://{addr}/quotes")
    }

    fn source(url: String) -> HttpQuoteSource {
        HttpQuoteSource::with_client(HttpClient::direct().unwrap(), url)
    }

    #[test]
    fn test_fetch_decodes_quotes() {
        let url = serve_once(
            "200 OK",
            r#"[{"id":1,"text":"A","category":"X","userId":9},{"id":2,"text":"B","category":"Y"}]"#,
        );

        let quotes = source(url).fetch().unwrap();

        assert_eq!(
            quotes,
            vec![Quote::new("A", "X").with_id(1), Quote::new("B", "Y").with_id(2)]
        );
    }

    #[test]
    fn test_fetch_error_status() {
        let url = serve_once("500 Internal Server Error", "[]");

        let err = source(url).fetch().unwrap_err();

        assert!(matches!(err, QuoteError::Network(_)));
        assert!(err.to_string().contains("500"), "got: {err}");
    }

    #[test]
    fn test_fetch_bad_body() {
        let url = serve_once("200 OK", r#"{"not":"an array"}"#);

        let err = source(url).fetch().unwrap_err();
        assert!(matches!(err, QuoteError::Network(_)));
    }

    #[test]
    fn test_fetch_maps_posts() {
        let url = serve_once(
            "200 OK",
            r#"[{"userId":1,"id":1,"title":"sunt aut facere","body":"quia et suscipit"},{"id":2,"text":"B","category":"Y"}]"#,
        );

        let quotes = source(url).fetch().unwrap();

        assert_eq!(
            quotes,
            vec![
                Quote::new("sunt aut facere", SERVER_CATEGORY).with_id(1),
                Quote::new("B", "Y").with_id(2),
            ]
        );
    }

    #[test]
    fn test_fetch_rejects_unknown_records() {
        let url = serve_once("200 OK", r#"[{"id":1,"body":"no title"}]"#);

        let err = source(url).fetch().unwrap_err();
        assert!(matches!(err, QuoteError::Network(_)));
    }
}
