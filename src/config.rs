use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use crate::services::file_processor::MAX_PREVIEW_ROWS;
use crate::services::stats::{AnalyzerOptions, DistinctMode};

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_file_size: usize,
    pub preview_rows: usize,
    pub analyzer: AnalyzerOptions,
    pub report_cache_capacity: u64,
    pub report_ttl: Duration,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            max_file_size: default_max_file_size(),
            preview_rows: MAX_PREVIEW_ROWS,
            analyzer: AnalyzerOptions::default(),
            report_cache_capacity: 64,
            report_ttl: Duration::from_secs(30 * 60),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let distinct_mode = match lookup("DISTINCT_MODE").as_deref() {
            None | Some("loose") => DistinctMode::Loose,
            Some("type_aware") => DistinctMode::TypeAware,
            Some(other) => anyhow::bail!("Invalid DISTINCT_MODE: {} (expected loose or type_aware)", other),
        };

        let top_k = parse_var(&lookup, "TOP_FREQUENCY_COUNT", defaults.analyzer.top_k)?;
        if top_k == 0 {
            anyhow::bail!("Invalid TOP_FREQUENCY_COUNT: 0 (must be at least 1)");
        }

        Ok(Config {
            host: parse_var(&lookup, "HOST", defaults.host)?,
            port: parse_var(&lookup, "PORT", defaults.port)?,
            max_file_size: parse_var(&lookup, "MAX_FILE_SIZE", defaults.max_file_size)?,
            preview_rows: parse_var(&lookup, "PREVIEW_ROWS", defaults.preview_rows)?,
            analyzer: AnalyzerOptions {
                top_k,
                distinct_mode,
            },
            report_cache_capacity: parse_var(&lookup, "REPORT_CACHE_CAPACITY", defaults.report_cache_capacity)?,
            report_ttl: Duration::from_secs(
                parse_var(&lookup, "REPORT_TTL_SECS", defaults.report_ttl.as_secs())?,
            ),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse {}={}", key, raw)),
        None => Ok(default),
    }
}

pub fn load_config() -> Result<Config> {
    Config::new()
}
