// src/config.rs
use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{default_tickers, Ticker};
use crate::services::browser::ChromeConfig;
use crate::services::refresh::{RefreshConfig, DEFAULT_EXTRACTION_TIMEOUT};
use crate::BoxError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub redis_url: String,
    pub refresh: RefreshConfig,
    pub chrome: ChromeConfig,
    /// Where `check_api` finds a running server.
    pub api_base_url: String,
}

impl AppConfig {
    /// Read the process environment. Call `dotenv().ok()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| format!("PORT must be a number, got '{}': {}", raw, e))?,
            None => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", port));

        let redis_url = lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());

        let tickers = match lookup("FII_TICKERS") {
            Some(raw) => parse_ticker_list(&raw)?,
            None => default_tickers(),
        };

        let extraction_timeout = match lookup("EXTRACTION_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| format!("EXTRACTION_TIMEOUT_SECS must be a number, got '{}': {}", raw, e))?;
                if secs == 0 {
                    return Err("EXTRACTION_TIMEOUT_SECS must be positive".into());
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_EXTRACTION_TIMEOUT,
        };

        let chrome = ChromeConfig {
            executable: lookup("CHROME_EXECUTABLE").map(PathBuf::from),
            user_data_dir: None,
            request_timeout: Some(extraction_timeout),
        };

        info!("Configured {} tickers, extraction timeout {:?}", tickers.len(), extraction_timeout);

        Ok(AppConfig {
            port,
            redis_url,
            refresh: RefreshConfig {
                tickers,
                extraction_timeout,
            },
            chrome,
            api_base_url,
        })
    }
}

/// Parse a comma-separated ticker list, dropping blanks and duplicates.
pub fn parse_ticker_list(raw: &str) -> Result<Vec<Ticker>, BoxError> {
    let mut tickers: Vec<Ticker> = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let ticker = Ticker::parse(part)?;
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    if tickers.is_empty() {
        return Err("FII_TICKERS is set but contains no tickers".into());
    }
    Ok(tickers)
}
