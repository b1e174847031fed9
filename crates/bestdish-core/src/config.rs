use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Largest `limit` the business search endpoint accepts per request.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid. A missing `YELP_API_KEY` is
/// reported later by [`AppConfig::require_yelp_api_key`].
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|value| !value.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let yelp_api_key = optional("YELP_API_KEY");
    let env = parse_environment(&or_default("BESTDISH_ENV", "development"))?;
    let log_level = or_default("BESTDISH_LOG_LEVEL", "info");
    let yelp_base_url = or_default("BESTDISH_YELP_BASE_URL", "https://api.yelp.com/v3/");

    let request_timeout_secs = parse("BESTDISH_REQUEST_TIMEOUT_SECS", "10")?;
    let page_timeout_secs = parse("BESTDISH_PAGE_TIMEOUT_SECS", "20")?;
    let page_size = parse_value::<u32>(
        "BESTDISH_PAGE_SIZE",
        &or_default("BESTDISH_PAGE_SIZE", "50"),
    )?;
    let max_results = parse_value::<u32>(
        "BESTDISH_MAX_RESULTS",
        &or_default("BESTDISH_MAX_RESULTS", "200"),
    )?;
    let max_retries = parse_value::<u32>(
        "BESTDISH_MAX_RETRIES",
        &or_default("BESTDISH_MAX_RETRIES", "2"),
    )?;
    let retry_backoff_base_ms = parse("BESTDISH_RETRY_BACKOFF_BASE_MS", "500")?;

    let cache_ttl_secs = parse("BESTDISH_CACHE_TTL_SECS", "7200")?;
    let cache_radius_meters = parse_value::<f64>(
        "BESTDISH_CACHE_RADIUS_METERS",
        &or_default("BESTDISH_CACHE_RADIUS_METERS", "500"),
    )?;
    let cache_max_entries = parse_value::<usize>(
        "BESTDISH_CACHE_MAX_ENTRIES",
        &or_default("BESTDISH_CACHE_MAX_ENTRIES", "64"),
    )?;
    let search_debounce_ms = parse("BESTDISH_SEARCH_DEBOUNCE_MS", "500")?;
    let label_store_dir = PathBuf::from(or_default("BESTDISH_LABEL_STORE_DIR", "./data"));

    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::InvalidEnvVar {
            var: "BESTDISH_PAGE_SIZE".to_string(),
            reason: format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
        });
    }
    if max_results == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BESTDISH_MAX_RESULTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if !cache_radius_meters.is_finite() || cache_radius_meters < 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BESTDISH_CACHE_RADIUS_METERS".to_string(),
            reason: format!("must be a non-negative distance, got {cache_radius_meters}"),
        });
    }
    if cache_max_entries == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BESTDISH_CACHE_MAX_ENTRIES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        yelp_api_key,
        yelp_base_url,
        request_timeout_secs,
        page_timeout_secs,
        page_size,
        max_results,
        max_retries,
        retry_backoff_base_ms,
        cache_ttl_secs,
        cache_radius_meters,
        cache_max_entries,
        search_debounce_ms,
        label_store_dir,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BESTDISH_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
