use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Only the network commands need it; see [`AppConfig::require_yelp_api_key`].
    pub yelp_api_key: Option<String>,
    pub yelp_base_url: String,
    pub request_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub page_size: u32,
    pub max_results: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub cache_ttl_secs: u64,
    pub cache_radius_meters: f64,
    pub cache_max_entries: usize,
    pub search_debounce_ms: u64,
    pub label_store_dir: PathBuf,
}

impl AppConfig {
    /// The Yelp credential, for callers that are about to hit the API.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `YELP_API_KEY` was unset
    /// or blank at load time.
    pub fn require_yelp_api_key(&self) -> Result<&str, ConfigError> {
        self.yelp_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("YELP_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "yelp_api_key",
                &self.yelp_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("yelp_base_url", &self.yelp_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_timeout_secs", &self.page_timeout_secs)
            .field("page_size", &self.page_size)
            .field("max_results", &self.max_results)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_radius_meters", &self.cache_radius_meters)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("label_store_dir", &self.label_store_dir)
            .finish()
    }
}
