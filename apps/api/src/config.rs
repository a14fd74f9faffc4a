use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use crate::scoring::config::{ScoringConfig, ScoringWeights, VerdictThresholds};

const DEFAULT_EMBEDDING_API_URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or unparsable.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Absent → fit analysis and feedback use their local fallbacks.
    pub anthropic_api_key: Option<String>,
    /// Absent → semantic similarity uses Jaccard overlap.
    pub embedding_api_key: Option<String>,
    pub embedding_api_url: String,
    pub embedding_model: String,
    pub external_timeout: Duration,
    /// Initial active scoring config. Not validated here; see `startup_scoring`.
    pub scoring: ScoringConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ScoringConfig::default();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_api_url: optional_env("EMBEDDING_API_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_API_URL.to_string()),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            external_timeout: Duration::from_secs(parse_env("EXTERNAL_TIMEOUT_SECS", 30)?),
            scoring: ScoringConfig {
                weights: ScoringWeights {
                    hard: parse_env("HARD_MATCH_WEIGHT", defaults.weights.hard)?,
                    semantic: parse_env("SEMANTIC_MATCH_WEIGHT", defaults.weights.semantic)?,
                    experience: parse_env("EXPERIENCE_WEIGHT", defaults.weights.experience)?,
                },
                thresholds: VerdictThresholds {
                    high: parse_env("HIGH_RELEVANCE_THRESHOLD", defaults.thresholds.high)?,
                    medium: parse_env("MEDIUM_RELEVANCE_THRESHOLD", defaults.thresholds.medium)?,
                },
            },
        })
    }

    /// The scoring config the service starts with. An invalid environment config is
    /// reported but used as given; the aggregator does not correct it.
    pub fn startup_scoring(&self) -> ScoringConfig {
        if let Err(e) = self.scoring.validate() {
            warn!("Scoring configuration from environment is invalid: {e}");
        }
        self.scoring
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(key, optional_env(key), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
