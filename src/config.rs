use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Run configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub podcast_id: String,
    /// Castos API token, sent as a query parameter
    pub token: String,
    /// Number given to the earliest episode
    pub base_episode_number: u32,
    /// Send the renumbered metadata back to Castos
    pub push_updates: bool,
    pub cache_dir: PathBuf,
    pub max_concurrent: usize,
    /// Minimum spacing between two API requests
    pub min_interval: Duration,
    /// Time zone the air dates in file names are expressed in
    pub utc_offset: FixedOffset,
}

const DEFAULT_API_BASE: &str = "https://app.castos.com/api/v2";
const DEFAULT_PODCAST_ID: &str = "9";
const DEFAULT_BASE_EPISODE_NUMBER: u32 = 339;
const DEFAULT_CACHE_DIR: &str = ".temp";
const DEFAULT_MAX_CONCURRENT: usize = 1;
const DEFAULT_MIN_INTERVAL_MS: u64 = 1500;
// recordings are labelled CST
const DEFAULT_UTC_OFFSET_HOURS: i32 = -6;

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment
    pub fn load() -> Result<Self> {
        if dotenvy::dotenv().is_ok() {
            tracing::debug!("Loaded .env file");
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = get("CASTOS_TOKEN").ok_or_else(|| anyhow!("CASTOS_TOKEN is not set"))?;

        let offset_hours: i32 = parse_or(
            "AIR_DATE_UTC_OFFSET_HOURS",
            get("AIR_DATE_UTC_OFFSET_HOURS"),
            DEFAULT_UTC_OFFSET_HOURS,
        )?;
        let utc_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("AIR_DATE_UTC_OFFSET_HOURS out of range: {}", offset_hours))?;

        let min_interval_ms: u64 = parse_or(
            "FETCH_MIN_INTERVAL_MS",
            get("FETCH_MIN_INTERVAL_MS"),
            DEFAULT_MIN_INTERVAL_MS,
        )?;

        Ok(Self {
            api_base: get("CASTOS_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            podcast_id: get("CASTOS_PODCAST_ID").unwrap_or_else(|| DEFAULT_PODCAST_ID.to_string()),
            token,
            base_episode_number: parse_or(
                "EPISODE_BASE_NUMBER",
                get("EPISODE_BASE_NUMBER"),
                DEFAULT_BASE_EPISODE_NUMBER,
            )?,
            push_updates: parse_bool("PUSH_UPDATES", get("PUSH_UPDATES"))?,
            cache_dir: get("EPISODE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            max_concurrent: parse_or(
                "FETCH_MAX_CONCURRENT",
                get("FETCH_MAX_CONCURRENT"),
                DEFAULT_MAX_CONCURRENT,
            )?,
            min_interval: Duration::from_millis(min_interval_ms),
            utc_offset,
        })
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, value)),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: Option<String>) -> Result<bool> {
    match value.as_deref().map(|v| v.trim().to_lowercase()).as_deref() {
        None => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(anyhow!("Invalid value for {}: {:?}", key, other)),
    }
}
