//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester:
//! - Building the shared HTTP client with user agent, headers, and timeout
//! - GET requests for one page at a time
//! - Classifying failures into attributable `FetchError`s
//!
//! There is no retry logic: every URL gets exactly one attempt.

use crate::config::CrawlerConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const POOL_MAX_IDLE_PER_HOST: usize = 100;

/// A failed fetch, always tied to the URL that produced it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchErrorKind {
    #[error("cancelled before the request was sent")]
    Cancelled,

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("received non-success status code: {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read document: {0}")]
    Parse(String),
}

impl FetchErrorKind {
    fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Parse(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// URL after redirects
    pub final_url: String,
    /// HTTP status code (always 2xx)
    pub status_code: u16,
    /// Decoded body
    pub body: String,
}

/// Builds the HTTP client shared by every worker
///
/// The client carries the configured User-Agent, the fixed `Accept` and
/// `Accept-Language` headers, and the per-request timeout. Its connection pool
/// is reused across all fetches of a run.
///
/// # Example
///
/// ```no_run
/// use title_harvest::config::CrawlerConfig;
/// use title_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));

    let timeout = config.request_timeout();

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs single-attempt page fetches over a shared client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with its own client from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Fetches one URL
    ///
    /// Returns immediately with `FetchErrorKind::Cancelled` if the token has
    /// already fired. A request that has been sent is never aborted; it runs to
    /// completion or to the client timeout.
    pub async fn fetch(
        &self,
        url: &str,
        token: &CancellationToken,
    ) -> Result<RawDocument, FetchError> {
        if token.is_cancelled() {
            return Err(FetchError::new(url, FetchErrorKind::Cancelled));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, FetchErrorKind::from_reqwest(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchErrorKind::Status(status.as_u16())));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, FetchErrorKind::from_reqwest(&e)))?;

        Ok(RawDocument {
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> CrawlerConfig {
        CrawlerConfig {
            user_agent: "TestHarvester/1.0".to_string(),
            request_timeout_secs: 2,
            ..CrawlerConfig::default()
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&test_config()).is_ok());
    }

    #[test]
    fn test_error_display_names_url() {
        let error = FetchError::new("https://example.com/x", FetchErrorKind::Status(503));
        let message = error.to_string();
        assert!(message.contains("https://example.com/x"));
        assert!(message.contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_success_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "TestHarvester/1.0"))
            .and(header_exists("accept"))
            .and(header_exists("accept-language"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::from_config(&test_config()).unwrap();
        let url = format!("{}/page", server.uri());
        let doc = fetcher
            .fetch(&url, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(doc.status_code, 200);
        assert_eq!(doc.body, "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = Fetcher::from_config(&test_config()).unwrap();
        let url = format!("{}/broken", server.uri());
        let error = fetcher
            .fetch(&url, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(error.url, url);
        assert_eq!(error.kind, FetchErrorKind::Status(500));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let config = CrawlerConfig {
            request_timeout_secs: 1,
            ..test_config()
        };
        let fetcher = Fetcher::from_config(&config).unwrap();
        let error = fetcher
            .fetch(&server.uri(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(error.kind, FetchErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_cancelled_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        token.cancel();

        let fetcher = Fetcher::from_config(&test_config()).unwrap();
        let error = fetcher.fetch(&server.uri(), &token).await.unwrap_err();

        assert_eq!(error.kind, FetchErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind and drop a listener to get a port nobody is serving on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = Fetcher::from_config(&test_config()).unwrap();
        let url = format!("http://{}/", addr);
        let error = fetcher
            .fetch(&url, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(error.kind, FetchErrorKind::Connect(_)));
    }
}
