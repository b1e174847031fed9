//! HTTP client for the Yelp Fusion business search endpoint.
//!
//! Wraps `reqwest` with bearer-token auth, typed status errors, retry with
//! back-off, and a hard per-page deadline.

mod fetch_all;

use std::time::Duration;

use bestdish_core::{AppConfig, Business, Coordinate};
use reqwest::{Client, Url};

use crate::error::YelpError;
use crate::retry::retry_with_backoff;
use crate::types::SearchResponse;

pub use fetch_all::{page_plan, NearbyBatch};

pub const DEFAULT_BASE_URL: &str = "https://api.yelp.com/v3/";

const SEARCH_PATH: &str = "businesses/search";

/// Tunables for [`YelpClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Transport timeout for a single HTTP request.
    pub request_timeout: Duration,
    /// Upper bound on one page including all of its retries.
    pub page_timeout: Duration,
    pub page_size: u32,
    /// Total result cap across all pages of a nearby fetch.
    pub max_results: u32,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            page_timeout: Duration::from_secs(20),
            page_size: 50,
            max_results: 200,
            max_retries: 2,
            backoff_base_ms: 500,
            user_agent: "bestdish/0.1 (nearby-dishes)".to_owned(),
        }
    }
}

impl ClientOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            page_size: config.page_size,
            max_results: config.max_results,
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            ..Self::default()
        }
    }
}

/// One page request against the search endpoint.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageQuery<'a> {
    pub coord: Coordinate,
    pub term: Option<&'a str>,
    pub limit: u32,
    pub offset: u32,
    pub sort_by: Option<&'static str>,
}

/// Client for the business search endpoint.
///
/// Use [`YelpClient::new`] for production or [`YelpClient::with_base_url`]
/// to point at a mock server in tests.
pub struct YelpClient {
    client: Client,
    api_key: String,
    base_url: Url,
    options: ClientOptions,
}

impl YelpClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YelpError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, options: ClientOptions) -> Result<Self, YelpError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, options)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`YelpError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`YelpError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        options: ClientOptions,
    ) -> Result<Self, YelpError> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(options.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| YelpError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(YelpError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
            options,
        })
    }

    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Fetches one distance-sorted page of businesses near `coord`.
    ///
    /// # Errors
    ///
    /// - [`YelpError::RateLimited`] / [`YelpError::Http`] / 5xx
    ///   [`YelpError::UnexpectedStatus`] after retries are exhausted.
    /// - [`YelpError::Unauthorized`] on 401/403 (not retried).
    /// - [`YelpError::Deserialize`] if the body does not match (not retried).
    /// - [`YelpError::PageTimeout`] if the page deadline elapses.
    pub async fn fetch_page(
        &self,
        coord: Coordinate,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Business>, YelpError> {
        self.request_page(PageQuery {
            coord,
            term: None,
            limit,
            offset,
            sort_by: Some("distance"),
        })
        .await
    }

    /// Server-side search for `term` near `coord`, one page, relevance order.
    ///
    /// A blank term returns an empty list without touching the network.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_page`].
    pub async fn search_businesses(
        &self,
        term: &str,
        coord: Coordinate,
    ) -> Result<Vec<Business>, YelpError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.request_page(PageQuery {
            coord,
            term: Some(term),
            limit: self.options.page_size,
            offset: 0,
            sort_by: None,
        })
        .await
    }

    /// Runs one page request with retry, bounded by the page deadline.
    async fn request_page(&self, query: PageQuery<'_>) -> Result<Vec<Business>, YelpError> {
        let url = self.search_url(&query);
        let page = retry_with_backoff(self.options.max_retries, self.options.backoff_base_ms, || {
            self.request_once(url.clone())
        });

        match tokio::time::timeout(self.options.page_timeout, page).await {
            Ok(result) => result,
            Err(_) => Err(YelpError::PageTimeout {
                offset: query.offset,
                timeout_ms: u64::try_from(self.options.page_timeout.as_millis())
                    .unwrap_or(u64::MAX),
            }),
        }
    }

    /// Sends a single GET and maps status codes to typed errors.
    async fn request_once(&self, url: Url) -> Result<Vec<Business>, YelpError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1);
            return Err(YelpError::RateLimited { retry_after_secs });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(YelpError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(YelpError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact_url(&url),
            });
        }

        let body = response.text().await?;
        let parsed =
            serde_json::from_str::<SearchResponse>(&body).map_err(|e| YelpError::Deserialize {
                context: format!("business search page {}", redact_url(&url)),
                source: e,
            })?;

        Ok(parsed.businesses.into_iter().map(Business::from).collect())
    }

    /// Builds `{base}/businesses/search?...` with percent-encoded parameters.
    fn search_url(&self, query: &PageQuery<'_>) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{SEARCH_PATH}", self.base_url.path()));
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("latitude", &query.coord.latitude.to_string());
            pairs.append_pair("longitude", &query.coord.longitude.to_string());
            if let Some(term) = query.term {
                pairs.append_pair("term", term);
            }
            pairs.append_pair("limit", &query.limit.to_string());
            pairs.append_pair("offset", &query.offset.to_string());
            if let Some(sort_by) = query.sort_by {
                pairs.append_pair("sort_by", sort_by);
            }
        }
        url
    }
}

/// Path and query only, so log lines and errors never carry the host's
/// credentials or userinfo.
fn redact_url(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_owned(),
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
