use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Root directory holding one slot directory per upload.
    pub storage_dir: PathBuf,
    pub analysis_service_url: String,
    pub analysis_timeout: Duration,
    /// Slots older than this are removed by the sweeper.
    pub upload_retention: Duration,
    pub sweep_interval: Duration,
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            storage_dir: std::env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./assets")),
            analysis_service_url: std::env::var("ANALYSIS_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000/analyze".to_string()),
            analysis_timeout: Duration::from_secs(parse_env("ANALYSIS_TIMEOUT_SECS", 60)?),
            upload_retention: Duration::from_secs(parse_env("UPLOAD_RETENTION_SECS", 3600)?),
            sweep_interval: Duration::from_secs(parse_env("SWEEP_INTERVAL_SECS", 300)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
