//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;
use url::Url;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the scripture client sends its requests and how long it keeps answers.
#[derive(Clone, Debug)]
pub struct ScriptureConfig {
    pub bible_api_base_url: Url,
    pub supersearch_base_url: Url,
    pub verse_of_the_day_url: Url,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub http_timeout: Duration,
}

impl Default for ScriptureConfig {
    fn default() -> Self {
        Self {
            bible_api_base_url: Url::parse(DEFAULT_BIBLE_API_BASE_URL)
                .expect("default bible-api url is valid"),
            supersearch_base_url: Url::parse(DEFAULT_SUPERSEARCH_BASE_URL)
                .expect("default supersearch url is valid"),
            verse_of_the_day_url: Url::parse(DEFAULT_VERSE_OF_THE_DAY_URL)
                .expect("default verse-of-the-day url is valid"),
            cache_ttl: Duration::from_secs(12 * 60 * 60),
            cache_max_entries: 1024,
            http_timeout: Duration::from_secs(15),
        }
    }
}

const DEFAULT_BIBLE_API_BASE_URL: &str = "https://bible-api.com/";
const DEFAULT_SUPERSEARCH_BASE_URL: &str = "https://api.biblesupersearch.com/api/";
const DEFAULT_VERSE_OF_THE_DAY_URL: &str =
    "https://beta.ourmanna.com/api/v1/get?format=json&order=daily";
const DEFAULT_AI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub cors_origin: String,
    pub session_ttl_days: i64,
    pub ai_api_key: Option<String>,
    pub ai_api_base: String,
    pub ai_model: String,
    pub scripture: ScriptureConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Server and Database Settings ---
        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;
        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let session_ttl_days: i64 = parse_var("SESSION_TTL_DAYS", "30")?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be a positive number of days".to_string(),
            ));
        }

        // --- AI Provider ---
        // GEMINI_API_KEY is honoured for deployments that predate AI_API_KEY.
        let ai_api_key = std::env::var("AI_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok();
        let ai_api_base =
            std::env::var("AI_API_BASE").unwrap_or_else(|_| DEFAULT_AI_API_BASE.to_string());
        let ai_model =
            std::env::var("AI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        // --- Scripture Providers ---
        let scripture = ScriptureConfig {
            bible_api_base_url: parse_var("BIBLE_API_BASE_URL", DEFAULT_BIBLE_API_BASE_URL)?,
            supersearch_base_url: parse_var(
                "SUPERSEARCH_API_BASE_URL",
                DEFAULT_SUPERSEARCH_BASE_URL,
            )?,
            verse_of_the_day_url: parse_var("VERSE_OF_THE_DAY_URL", DEFAULT_VERSE_OF_THE_DAY_URL)?,
            cache_ttl: Duration::from_secs(parse_var("SCRIPTURE_CACHE_TTL_SECS", "43200")?),
            cache_max_entries: parse_var("SCRIPTURE_CACHE_MAX_ENTRIES", "1024")?,
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", "15")?),
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            session_ttl_days,
            ai_api_key,
            ai_api_base,
            ai_model,
            scripture,
        })
    }
}

/// Reads `name` from the environment, falling back to `default`, and parses it.
fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_uses_default_when_unset() {
        let port: u16 = parse_var("BIBLE_NAV_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_var_reports_the_variable_name() {
        let err = parse_var::<u16>("BIBLE_NAV_TEST_UNSET_BAD", "not-a-port").unwrap_err();
        match err {
            ConfigError::InvalidValue(name, _) => assert_eq!(name, "BIBLE_NAV_TEST_UNSET_BAD"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn default_scripture_config_keeps_answers_for_twelve_hours() {
        let config = ScriptureConfig::default();
        assert_eq!(config.cache_ttl, Duration::from_secs(43_200));
        assert_eq!(config.bible_api_base_url.as_str(), "https://bible-api.com/");
    }
}
