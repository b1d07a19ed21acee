use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str =
    "https://asia-south1-covisearch2.cloudfunctions.net/covisearchapi";

pub const DEFAULT_SITE_URL: &str = "https://www.covisearch.in";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed.
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
/// Returns `ConfigError` if a variable holds a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("COVISEARCH_ENV", "development"))?;
    let log_level = or_default("COVISEARCH_LOG_LEVEL", "info");

    let api_base_url = or_default("COVISEARCH_API_BASE_URL", DEFAULT_API_BASE_URL);
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "COVISEARCH_API_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{api_base_url}'"),
        });
    }

    let request_timeout_secs = parse_u64("COVISEARCH_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("COVISEARCH_USER_AGENT", "covisearch/0.1 (lead-search)");
    let max_retries = parse_u32("COVISEARCH_MAX_RETRIES", "5")?;
    let retry_delay_ms = parse_u64("COVISEARCH_RETRY_DELAY_MS", "2000")?;
    let site_url = or_default("COVISEARCH_SITE_URL", DEFAULT_SITE_URL);

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_delay_ms,
        site_url,
        resources_path: optional_path("COVISEARCH_RESOURCES_PATH"),
        sources_path: optional_path("COVISEARCH_SOURCES_PATH"),
        cities_path: optional_path("COVISEARCH_CITIES_PATH"),
        city_locations_path: optional_path("COVISEARCH_CITY_LOCATIONS_PATH"),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COVISEARCH_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
