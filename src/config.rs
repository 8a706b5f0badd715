//! Runtime configuration loaded from the environment.
//!
//! [`Settings::from_env`] reads a `.env` file when present and then the
//! process environment. Every value except the optional integrations has a
//! default, so a bare `synchrohr serve` starts an in-memory instance.

use crate::interview::{domain::Interview, services::SchedulerSettings};
use crate::notification::services::QueueSettings;
use crate::pipeline::{
    adapters::openai::AnalyzerSettings,
    domain::{AtsScore, ScreeningPolicy},
};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_PORTAL_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_AI_ENDPOINT: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
const DEFAULT_AI_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const MAX_CLAIM_TIMEOUT_SECS: i64 = 86_400;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that cannot be parsed.
    #[error("environment variable {key} has invalid value '{value}'")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// A variable is required because a related one is set.
    #[error("environment variable {key} is required when {because} is set")]
    Missing {
        /// Missing variable.
        key: &'static str,
        /// Variable that requires it.
        because: &'static str,
    },
}

/// Location and credentials of the hosted mail functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionsSettings {
    /// Functions host, e.g. `https://project.supabase.co`.
    pub base_url: String,
    /// Bearer key sent with each call.
    pub api_key: String,
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `PostgreSQL` URL. In-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub database_max_connections: u32,
    /// HTTP listen port.
    pub port: u16,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Mail functions. A recording gateway is used when absent.
    pub functions: Option<FunctionsSettings>,
    /// Resume analysis model. AI screening is disabled when absent.
    pub analyzer: Option<AnalyzerSettings>,
    /// Score threshold for AI selection.
    pub screening_policy: ScreeningPolicy,
    /// Email retry and batching limits.
    pub queue: QueueSettings,
    /// Interval between background queue runs.
    pub poll_interval: Duration,
    /// Interview link and token settings.
    pub scheduler: SchedulerSettings,
    /// Whether a manual selection schedules the interview at once.
    pub auto_schedule_interview: bool,
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value cannot be parsed or a required
    /// companion variable is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value cannot be parsed or a required
    /// companion variable is missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let functions = match (var("FUNCTIONS_BASE_URL"), var("FUNCTIONS_API_KEY")) {
            (Some(base_url), Some(api_key)) => Some(FunctionsSettings { base_url, api_key }),
            (Some(_), None) => {
                return Err(ConfigError::Missing {
                    key: "FUNCTIONS_API_KEY",
                    because: "FUNCTIONS_BASE_URL",
                });
            }
            (None, _) => None,
        };

        let analyzer = var("AI_API_KEY").map(|api_key| AnalyzerSettings {
            endpoint: var("AI_ENDPOINT").unwrap_or_else(|| DEFAULT_AI_ENDPOINT.to_owned()),
            model: var("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_owned()),
            api_key,
        });

        let mut scheduler = SchedulerSettings::new(
            var("PORTAL_BASE_URL").unwrap_or_else(|| DEFAULT_PORTAL_BASE_URL.to_owned()),
        );
        scheduler.token_ttl_hours = parse_where(
            "INTERVIEW_TOKEN_TTL_HOURS",
            var("INTERVIEW_TOKEN_TTL_HOURS"),
            SchedulerSettings::DEFAULT_TOKEN_TTL_HOURS,
            |hours| *hours > 0,
        )?;
        scheduler.default_delay_hours = parse_where(
            "INTERVIEW_DELAY_HOURS",
            var("INTERVIEW_DELAY_HOURS"),
            SchedulerSettings::DEFAULT_DELAY_HOURS,
            |hours| *hours <= Interview::MAX_DELAY_HOURS,
        )?;

        let queue = QueueSettings {
            max_retries: parse_where(
                "EMAIL_MAX_RETRIES",
                var("EMAIL_MAX_RETRIES"),
                QueueSettings::DEFAULT_MAX_RETRIES,
                |retries| *retries > 0,
            )?,
            batch_size: parse_where(
                "EMAIL_BATCH_SIZE",
                var("EMAIL_BATCH_SIZE"),
                QueueSettings::DEFAULT_BATCH_SIZE,
                |size| *size > 0,
            )?,
            claim_timeout: chrono::Duration::seconds(parse_where(
                "EMAIL_CLAIM_TIMEOUT_SECS",
                var("EMAIL_CLAIM_TIMEOUT_SECS"),
                QueueSettings::DEFAULT_CLAIM_TIMEOUT_SECS,
                |secs| (1..=MAX_CLAIM_TIMEOUT_SECS).contains(secs),
            )?),
        };

        Ok(Self {
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_where(
                "DATABASE_MAX_CONNECTIONS",
                var("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_DB_MAX_CONNECTIONS,
                |connections| *connections > 0,
            )?,
            port: parse_or("PORT", var("PORT"), DEFAULT_PORT)?,
            log_filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
            functions,
            analyzer,
            screening_policy: ScreeningPolicy::new(parse_where(
                "ATS_THRESHOLD",
                var("ATS_THRESHOLD"),
                ScreeningPolicy::DEFAULT_THRESHOLD,
                |threshold| *threshold <= AtsScore::MAX,
            )?),
            queue,
            poll_interval: Duration::from_secs(parse_where(
                "EMAIL_POLL_INTERVAL_SECS",
                var("EMAIL_POLL_INTERVAL_SECS"),
                DEFAULT_POLL_INTERVAL_SECS,
                |secs| *secs > 0,
            )?),
            scheduler,
            auto_schedule_interview: parse_flag(
                "AUTO_SCHEDULE_INTERVIEW",
                var("AUTO_SCHEDULE_INTERVIEW"),
                true,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    parse_where(key, raw, default, |_| true)
}

/// Parses `raw`, rejecting values that parse but fail `valid`.
fn parse_where<T, F>(
    key: &'static str,
    raw: Option<String>,
    default: T,
    valid: F,
) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    raw.map_or(Ok(default), |value| match value.parse::<T>() {
        Ok(parsed) if valid(&parsed) => Ok(parsed),
        _ => Err(ConfigError::Invalid { key, value }),
    })
}

fn parse_flag(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    raw.map_or(Ok(default), |value| match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    })
}
