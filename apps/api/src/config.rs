use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::curriculum::OrchestratorSettings;
use crate::generation::AgentSettings;
use crate::resources::semantic_scholar::SEMANTIC_SCHOLAR_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a number does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Absent means generation is disabled and every module is templated.
    pub anthropic_api_key: Option<String>,
    pub semantic_scholar_api_key: Option<String>,
    pub semantic_scholar_url: String,
    pub enable_resource_lookup: bool,
    pub generation_max_attempts: u32,
    pub generation_timeout: Duration,
    pub generation_backoff: Duration,
    pub generation_concurrency: usize,
    pub strict_generation: bool,
    pub lookup_timeout: Duration,
    pub resources_per_skill: usize,
    pub request_timeout: Duration,
    pub study_hours_per_week: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            semantic_scholar_api_key: optional_env("SEMANTIC_SCHOLAR_API_KEY"),
            semantic_scholar_url: optional_env("SEMANTIC_SCHOLAR_URL")
                .unwrap_or_else(|| SEMANTIC_SCHOLAR_URL.to_string()),
            enable_resource_lookup: parse_env("ENABLE_RESOURCE_LOOKUP", true)?,
            generation_max_attempts: parse_env("GENERATION_MAX_ATTEMPTS", 3)?,
            generation_timeout: Duration::from_secs(parse_env("GENERATION_TIMEOUT_SECS", 60)?),
            generation_backoff: Duration::from_millis(parse_env("GENERATION_BACKOFF_MS", 1000)?),
            generation_concurrency: parse_env("GENERATION_CONCURRENCY", 4)?,
            strict_generation: parse_env("STRICT_GENERATION", false)?,
            lookup_timeout: Duration::from_secs(parse_env("LOOKUP_TIMEOUT_SECS", 30)?),
            resources_per_skill: parse_env("RESOURCES_PER_SKILL", 3)?,
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 300)?),
            study_hours_per_week: parse_env("STUDY_HOURS_PER_WEEK", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn agent_settings(&self) -> AgentSettings {
        let defaults = AgentSettings::default();
        AgentSettings {
            max_attempts: self.generation_max_attempts.max(1),
            call_timeout: self.generation_timeout,
            initial_backoff: self.generation_backoff,
            max_backoff: defaults.max_backoff.max(self.generation_backoff),
            strict: self.strict_generation,
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            concurrency: self.generation_concurrency.max(1),
            lookup_timeout: self.lookup_timeout,
            resources_per_skill: self.resources_per_skill,
            request_timeout: self.request_timeout,
            hours_per_week: self.study_hours_per_week.max(1),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}
