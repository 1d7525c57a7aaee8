//! Byte-fetch collaborators for remote `$ref` documents
//!
//! The resolver never talks to a transport directly; it asks a
//! [`SchemaFetcher`] for the bytes behind an absolute URI. Fetches block the
//! compiling thread.
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::error::FetchError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// Source of remote schema documents
pub trait SchemaFetcher: Send + Sync {
    /// Fetch the raw bytes of the document at `uri` (fragment already removed)
    fn fetch(&self, uri: &Url) -> Result<Vec<u8>, FetchError>;
}

impl<F> SchemaFetcher for F
where
    F: Fn(&Url) -> Result<Vec<u8>, FetchError> + Send + Sync,
{
    fn fetch(&self, uri: &Url) -> Result<Vec<u8>, FetchError> {
        self(uri)
    }
}

/// Fetcher used when nothing else is configured
pub fn default_fetcher() -> Arc<dyn SchemaFetcher> {
    #[cfg(feature = "http")]
    {
        Arc::new(HttpFetcher::new())
    }
    #[cfg(not(feature = "http"))]
    {
        Arc::new(NoFetcher)
    }
}

/// Refuses every fetch
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFetcher;

impl SchemaFetcher for NoFetcher {
    fn fetch(&self, uri: &Url) -> Result<Vec<u8>, FetchError> {
        Err(format!("remote references are disabled (requested {})", uri).into())
    }
}

/// Reads `file://` URIs from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl SchemaFetcher for FileFetcher {
    fn fetch(&self, uri: &Url) -> Result<Vec<u8>, FetchError> {
        if uri.scheme() != "file" {
            return Err(format!("unsupported scheme '{}' for file fetcher", uri.scheme()).into());
        }
        let path = uri
            .to_file_path()
            .map_err(|_| format!("'{}' is not a local file path", uri))?;
        Ok(std::fs::read(path)?)
    }
}

/// In-memory documents keyed by URI
///
/// Keys are compared without fragment, so `http://x/a.json` and
/// `http://x/a.json#` address the same document.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw document bytes
    pub fn with_document<U, B>(mut self, uri: U, bytes: B) -> Self
    where
        U: AsRef<str>,
        B: Into<Vec<u8>>,
    {
        let key = uri.as_ref().trim_end_matches('#').to_string();
        self.documents.insert(key, bytes.into());
        self
    }

    /// Register a document given as a JSON value
    pub fn with_json<U: AsRef<str>>(self, uri: U, document: &serde_json::Value) -> Self {
        self.with_document(uri, document.to_string())
    }

    /// Number of fetch calls served so far, successful or not
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SchemaFetcher for StaticFetcher {
    fn fetch(&self, uri: &Url) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut key = uri.clone();
        key.set_fragment(None);
        self.documents
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| format!("no document registered for {}", key).into())
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use super::SchemaFetcher;
    use crate::error::FetchError;
    use reqwest::blocking::Client;
    use std::sync::OnceLock;
    use std::time::Duration;
    use url::Url;

    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Fetches `http`/`https` documents with a blocking `reqwest` client
    ///
    /// Must not be called from inside an async runtime.
    #[derive(Debug)]
    pub struct HttpFetcher {
        timeout: Duration,
        client: OnceLock<Client>,
    }

    impl HttpFetcher {
        pub fn new() -> Self {
            Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        }

        pub fn with_timeout(timeout: Duration) -> Self {
            Self {
                timeout,
                client: OnceLock::new(),
            }
        }

        pub fn timeout(&self) -> Duration {
            self.timeout
        }

        fn client(&self) -> Result<&Client, FetchError> {
            if let Some(client) = self.client.get() {
                return Ok(client);
            }
            let built = Client::builder().timeout(self.timeout).build()?;
            Ok(self.client.get_or_init(|| built))
        }
    }

    impl Default for HttpFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SchemaFetcher for HttpFetcher {
        fn fetch(&self, uri: &Url) -> Result<Vec<u8>, FetchError> {
            match uri.scheme() {
                "http" | "https" => {}
                other => return Err(format!("unsupported scheme '{}' for http fetcher", other).into()),
            }

            tracing::debug!(uri = %uri, "fetching remote schema");
            let response = self.client()?.get(uri.as_str()).send()?.error_for_status()?;
            Ok(response.bytes()?.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_static_fetcher() {
        let fetcher = StaticFetcher::new()
            .with_document("http://example.com/a.json#", r#"{"type": "string"}"#);

        let uri = Url::parse("http://example.com/a.json#/definitions").unwrap();
        assert_eq!(fetcher.fetch(&uri).unwrap(), br#"{"type": "string"}"#.to_vec());

        let missing = Url::parse("http://example.com/b.json").unwrap();
        assert!(fetcher.fetch(&missing).is_err());
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[test]
    fn test_no_fetcher() {
        let uri = Url::parse("http://example.com/a.json").unwrap();
        let err = NoFetcher.fetch(&uri).unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_file_fetcher() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remote.json");
        fs::write(&path, r#"{"type": "integer"}"#).unwrap();

        let uri = Url::from_file_path(&path).unwrap();
        assert_eq!(FileFetcher.fetch(&uri).unwrap(), br#"{"type": "integer"}"#.to_vec());

        let http = Url::parse("http://example.com/a.json").unwrap();
        assert!(FileFetcher.fetch(&http).is_err());
    }

    #[test]
    fn test_closure_fetcher() {
        let fetcher = |uri: &Url| -> Result<Vec<u8>, FetchError> {
            Ok(format!(r#"{{"title": "{}"}}"#, uri.path()).into_bytes())
        };
        let uri = Url::parse("http://example.com/x.json").unwrap();
        assert_eq!(fetcher.fetch(&uri).unwrap(), br#"{"title": "/x.json"}"#.to_vec());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_fetcher_rejects_other_schemes() {
        let fetcher = HttpFetcher::with_timeout(std::time::Duration::from_secs(1));
        assert_eq!(fetcher.timeout(), std::time::Duration::from_secs(1));
        let uri = Url::parse("ftp://example.com/a.json").unwrap();
        assert!(fetcher.fetch(&uri).is_err());
    }
}
