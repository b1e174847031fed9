use thiserror::Error;

/// Errors returned by the business search client.
#[derive(Debug, Error)]
pub enum YelpError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by business search (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// HTTP 401/403; the API key is missing, revoked, or lacks access.
    #[error("business search rejected the API key (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("page at offset {offset} did not finish within {timeout_ms}ms")]
    PageTimeout { offset: u32, timeout_ms: u64 },

    #[error("all {pages} pages failed; last error: {last_error}")]
    AllPagesFailed {
        pages: usize,
        #[source]
        last_error: Box<YelpError>,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
