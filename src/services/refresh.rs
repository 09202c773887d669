// src/services/refresh.rs
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::fmt;
use std::time::Duration;

use crate::models::{default_tickers, DividendRecord, Ticker};
use super::browser::{BrowserLauncher, BrowserSession, Result};
use super::cache::DividendCache;
use super::extractor::extract_dividends;
use super::normalizer::normalize;

pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub tickers: Vec<Ticker>,
    /// Bound for each navigation and each selector wait.
    pub extraction_timeout: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            tickers: default_tickers(),
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The page had no dividend table.
    NoData,
    /// The table had no usable body row.
    NoRecord,
    Extraction(String),
    CacheWrite(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "dividend table not found"),
            SkipReason::NoRecord => write!(f, "dividend table has no rows"),
            SkipReason::Extraction(e) => write!(f, "extraction failed: {}", e),
            SkipReason::CacheWrite(e) => write!(f, "cache write failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerOutcome {
    Cached(DividendRecord),
    Skipped(SkipReason),
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<(Ticker, TickerOutcome)>,
}

impl BatchReport {
    pub fn cached(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, TickerOutcome::Cached(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.cached()
    }

    pub fn outcome(&self, ticker: &Ticker) -> Option<&TickerOutcome> {
        self.outcomes
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, outcome)| outcome)
    }
}

/// Run one refresh batch over every configured ticker.
///
/// Only a browser launch failure is returned as an error; per-ticker problems
/// are recorded in the report and the batch moves on. The browser is shut down
/// before returning, forcibly if the graceful close fails.
pub async fn refresh_dividends(
    launcher: &dyn BrowserLauncher,
    cache: &DividendCache,
    config: &RefreshConfig,
) -> Result<BatchReport> {
    let started_at = Utc::now();
    info!("Starting dividend refresh for {} tickers", config.tickers.len());

    let mut browser = launcher.launch().await.map_err(|e| {
        error!("Failed to launch browser, aborting refresh: {}", e);
        e
    })?;

    let mut outcomes = Vec::with_capacity(config.tickers.len());
    for ticker in &config.tickers {
        let outcome = refresh_ticker(&*browser, cache, ticker, config.extraction_timeout).await;
        if let TickerOutcome::Skipped(reason) = &outcome {
            warn!("Skipping {}: {}", ticker, reason);
        }
        outcomes.push((ticker.clone(), outcome));
    }

    shutdown(&mut *browser).await;

    let report = BatchReport {
        started_at,
        finished_at: Utc::now(),
        outcomes,
    };
    info!(
        "Dividend refresh finished in {}s: {} cached, {} skipped",
        (report.finished_at - report.started_at).num_seconds(),
        report.cached(),
        report.skipped()
    );
    Ok(report)
}

async fn refresh_ticker(
    browser: &dyn BrowserSession,
    cache: &DividendCache,
    ticker: &Ticker,
    timeout: Duration,
) -> TickerOutcome {
    let rows = match extract_dividends(browser, ticker, timeout).await {
        Ok(Some(rows)) => rows,
        Ok(None) => return TickerOutcome::Skipped(SkipReason::NoData),
        Err(e) => return TickerOutcome::Skipped(SkipReason::Extraction(e.to_string())),
    };

    let Some(record) = normalize(&rows) else {
        return TickerOutcome::Skipped(SkipReason::NoRecord);
    };

    match cache.store(ticker, &record).await {
        Ok(()) => {
            info!("Cached dividends for {}: {} rows on page, latest {:?}", ticker, rows.len(), record.value());
            TickerOutcome::Cached(record)
        }
        Err(e) => TickerOutcome::Skipped(SkipReason::CacheWrite(e.to_string())),
    }
}

async fn shutdown(browser: &mut dyn BrowserSession) {
    if let Err(e) = browser.close().await {
        warn!("Browser did not close cleanly ({}), forcing termination", e);
        if let Err(e) = browser.kill().await {
            error!("Failed to kill browser process: {}", e);
        }
    }
}
