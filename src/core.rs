use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::config::{EdgarConfig, EdgarUrls};
use super::error::{EdgarError, Result};

const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 1000;
const PREVIEW_CHARS: usize = 200;

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Rate-limited HTTP client for SEC EDGAR.
///
/// `Edgar` is the filing data source behind the exporter. It resolves tickers, reads
/// submission histories and downloads primary filing documents, while staying inside
/// SEC.gov fair access rules:
///
/// ```text
/// Token Bucket (capacity: rate_limit tokens)
/// ┌──────────────────────────┐
/// │ ████████████████████████ │  ← refills at rate_limit/sec
/// └──────────────────────────┘
///      ↓ one token per request
/// ```
///
/// HTTP 429 responses and transport failures are retried with exponential backoff and
/// jitter, up to five times. Every other failure is returned to the caller as is.
///
/// # Examples
///
/// ```rust
/// # use edgardump::Edgar;
/// let edgar = Edgar::new("my_app/1.0 (my@email.com)")?;
/// # Ok::<(), edgardump::EdgarError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Edgar {
    pub(crate) client: reqwest::Client,
    pub(crate) rate_limiter: Arc<Governor>,
    pub(crate) edgar_archives_url: String,
    pub(crate) edgar_data_url: String,
    pub(crate) edgar_files_url: String,
}

impl Edgar {
    /// Creates a client with the default rate limit (10/s), timeout (30s) and SEC.gov URLs.
    ///
    /// The SEC asks automated tools to identify themselves with a user agent of the
    /// form `"AppName contact@example.com"`; it is sent with every request.
    pub fn new(user_agent: &str) -> Result<Self> {
        let config = EdgarConfig {
            user_agent: user_agent.to_string(),
            ..EdgarConfig::default()
        };
        Self::with_config(config)
    }

    /// Creates a client from an explicit [`EdgarConfig`].
    ///
    /// # Errors
    ///
    /// Returns `EdgarError::ConfigError` if the user agent is not a valid header value,
    /// the rate limit is zero, or the HTTP client cannot be built.
    pub fn with_config(config: EdgarConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| EdgarError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| EdgarError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                EdgarError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        let EdgarUrls {
            archives,
            data,
            files,
        } = config.base_urls;

        Ok(Edgar {
            client,
            rate_limiter,
            edgar_archives_url: archives,
            edgar_data_url: data,
            edgar_files_url: files,
        })
    }

    /// Backoff for the given retry attempt: `2^retry` seconds, ±20% jitter.
    fn calculate_backoff(retry: u32) -> Duration {
        let backoff_ms = INITIAL_BACKOFF_MS * (2_u64.pow(retry));
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// Fetches a URL as text, waiting on the rate limiter before every attempt.
    ///
    /// For `.json` URLs an HTML body is treated as an error page and reported as
    /// `EdgarError::UnexpectedContentType`, unless the body actually looks like JSON
    /// (SEC occasionally mislabels its JSON as `text/html`).
    ///
    /// # Errors
    ///
    /// * `EdgarError::NotFound` - HTTP 404
    /// * `EdgarError::RateLimitExceeded` - HTTP 429 after all retries
    /// * `EdgarError::RequestError` - transport failure after all retries
    /// * `EdgarError::InvalidResponse` - any other non-success status
    pub async fn get(&self, url: &str) -> Result<String> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;
            tracing::debug!("GET {}", url);

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    if retries >= MAX_RETRIES {
                        return Err(EdgarError::RequestError(e));
                    }
                    let backoff = Self::calculate_backoff(retries);
                    tracing::warn!(
                        "Request failed for {}: {}. Attempt {}/{}. Retrying in {:?}.",
                        url,
                        e,
                        retries + 1,
                        MAX_RETRIES + 1,
                        backoff
                    );
                    sleep(backoff).await;
                    retries += 1;
                    continue;
                }
            };

            let status = response.status();
            let headers = response.headers().clone();

            match status {
                StatusCode::OK => {
                    let body = response.text().await.map_err(EdgarError::RequestError)?;
                    return Self::check_json_body(url, &headers, body);
                }
                StatusCode::NOT_FOUND => return Err(EdgarError::NotFound),
                StatusCode::TOO_MANY_REQUESTS => {
                    if retries >= MAX_RETRIES {
                        return Err(EdgarError::RateLimitExceeded);
                    }

                    let wait = headers
                        .get("retry-after")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or_else(|| Self::calculate_backoff(retries));

                    tracing::warn!(
                        "Rate limit hit (429) for {}. Attempt {}/{}. Waiting {:?}.",
                        url,
                        retries + 1,
                        MAX_RETRIES + 1,
                        wait
                    );
                    sleep(wait).await;
                    retries += 1;
                }
                other => {
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    return Err(EdgarError::InvalidResponse(format!(
                        "Unexpected status code: {} for URL: {}. Response preview: {}",
                        other,
                        url,
                        body.chars().take(PREVIEW_CHARS).collect::<String>()
                    )));
                }
            }
        }
    }

    /// Fetches a JSON document and deserializes it.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn check_json_body(url: &str, headers: &HeaderMap, body: String) -> Result<String> {
        if !url.ends_with(".json") {
            return Ok(body);
        }

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .unwrap_or_default();

        if !content_type.to_lowercase().contains("text/html") {
            return Ok(body);
        }

        let trimmed = body.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            tracing::warn!(
                "Received text/html content-type for .json URL, but content appears to be JSON: {}",
                url
            );
            return Ok(body);
        }

        Err(EdgarError::UnexpectedContentType {
            url: url.to_string(),
            expected_pattern: "application/json".to_string(),
            got_content_type: content_type.to_string(),
            content_preview: body.chars().take(PREVIEW_CHARS).collect(),
        })
    }

    /// Returns the base URL for EDGAR archives.
    pub fn archives_url(&self) -> &str {
        &self.edgar_archives_url
    }

    /// Returns the base URL for EDGAR data.
    pub fn data_url(&self) -> &str {
        &self.edgar_data_url
    }

    /// Returns the base URL for EDGAR files.
    pub fn files_url(&self) -> &str {
        &self.edgar_files_url
    }
}
