//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

use postcraft_core::{PaddingPolicy, PipelineSettings};

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub completion_model: String,
    pub google_search_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub trend_model: String,
    pub search_all_topics: bool,
    pub search_result_count: usize,
    pub padding: PaddingPolicy,
    /// Relay prefixes tried after the direct fetch, in order.
    pub article_proxies: Vec<String>,
    pub allowed_origin: String,
    pub static_dir: Option<PathBuf>,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Each minimum has its own variable; unset ones keep the default.
fn padding_from_env() -> Result<PaddingPolicy, ConfigError> {
    let defaults = PaddingPolicy::default();
    Ok(PaddingPolicy {
        enabled: parsed("PAD_TO_MINIMUM", defaults.enabled)?,
        tweet_min_chars: parsed("TWEET_MIN_CHARS", defaults.tweet_min_chars)?,
        linkedin_min_chars: parsed("LINKEDIN_MIN_CHARS", defaults.linkedin_min_chars)?,
        thread_tweet_min_chars: parsed("THREAD_TWEET_MIN_CHARS", defaults.thread_tweet_min_chars)?,
    })
}

/// Splits a comma-separated proxy list, dropping empty entries.
pub fn parse_proxy_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// The relays used when `ARTICLE_PROXIES` is unset. The `allorigins` relay
/// takes the percent-encoded target URL and answers with JSON; the others
/// take the raw URL appended to the prefix.
pub const DEFAULT_ARTICLE_PROXIES: [&str; 3] = [
    "https://api.allorigins.win/get?url=",
    "https://cors-anywhere.herokuapp.com/",
    "https://thingproxy.freeboard.io/fetch/",
];

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let openai_api_key = var("OPENAI_API_KEY");
        let google_search_api_key = var("GOOGLE_SEARCH_API_KEY");
        let google_search_engine_id = var("GOOGLE_SEARCH_ENGINE_ID");
        let perplexity_api_key = var("PERPLEXITY_API_KEY");

        // --- Load Pipeline Settings ---
        let completion_model = var("COMPLETION_MODEL").unwrap_or_else(|| "gpt-4o".to_string());
        let trend_model = var("TREND_MODEL").unwrap_or_else(|| "sonar".to_string());
        let search_all_topics = parsed("SEARCH_ALL_TOPICS", true)?;
        let search_result_count = parsed("SEARCH_RESULT_COUNT", 5usize)?;

        let padding = padding_from_env()?;

        let article_proxies = match var("ARTICLE_PROXIES") {
            Some(raw) => parse_proxy_list(&raw),
            None => DEFAULT_ARTICLE_PROXIES.iter().map(|p| p.to_string()).collect(),
        };

        // --- Load Web Settings ---
        let allowed_origin =
            var("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let static_dir = var("STATIC_DIR").map(PathBuf::from);

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            completion_model,
            google_search_api_key,
            google_search_engine_id,
            perplexity_api_key,
            trend_model,
            search_all_topics,
            search_result_count,
            padding,
            article_proxies,
            allowed_origin,
            static_dir,
        })
    }

    /// The settings handed to the content pipeline.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            model: self.completion_model.clone(),
            search_all_topics: self.search_all_topics,
            search_result_count: self.search_result_count,
            padding: self.padding.clone(),
        }
    }
}
