use std::{env::var, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use stock::CacheConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub search_debounce: Duration,
    pub cache: CacheConfig,
    pub chart_dir: PathBuf,
    pub display_tz: Tz,
    pub version: String,
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {name}={raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = CacheConfig::default();

        let display_tz = var("DISPLAY_TZ").unwrap_or_else(|_| "America/New_York".to_string());
        let display_tz = display_tz
            .parse::<Tz>()
            .map_err(|e| anyhow!("DISPLAY_TZ must be an IANA zone name: {e}"))?;

        Ok(Self {
            api_base_url: var("STOCK_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            api_timeout: Duration::from_secs(parse_var("STOCK_API_TIMEOUT_SECS", 30)?),
            search_debounce: Duration::from_millis(parse_var("SEARCH_DEBOUNCE_MS", 1500)?),
            cache: CacheConfig {
                dedupe_interval: Duration::from_millis(parse_var(
                    "CACHE_DEDUPE_MS",
                    defaults.dedupe_interval.as_millis() as u64,
                )?),
                max_entries: parse_var("CACHE_MAX_ENTRIES", defaults.max_entries)?,
            },
            chart_dir: var("CHART_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("charts")),
            display_tz,
            version: var("APP_VERSION").unwrap_or_else(|_| "Unknown".to_string()),
        })
    }
}
