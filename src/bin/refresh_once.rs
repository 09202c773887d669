// src/bin/refresh_once.rs
use fii_dividends::config::AppConfig;
use fii_dividends::services::browser::ChromeLauncher;
use fii_dividends::services::cache::{DividendCache, RedisStore};
use fii_dividends::services::refresh::{refresh_dividends, TickerOutcome};
use log::{info, error};
use dotenv::dotenv;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let store = RedisStore::connect(&config.redis_url).await.map_err(|e| anyhow::anyhow!(e))?;
    let cache = DividendCache::new(Arc::new(store));
    let launcher = ChromeLauncher::new(config.chrome.clone());

    info!("Running a single dividend refresh batch...");
    let report = match refresh_dividends(&launcher, &cache, &config.refresh).await {
        Ok(report) => report,
        Err(e) => {
            error!("✗ Refresh could not start: {}", e);
            return Err(anyhow::anyhow!(e));
        }
    };

    for (ticker, outcome) in &report.outcomes {
        match outcome {
            TickerOutcome::Cached(record) => println!(
                "{:<8} cached   VALOR={} DATA COM={} PAGAMENTO={}",
                ticker,
                record.value().unwrap_or("-"),
                record.ex_date().unwrap_or("-"),
                record.payment_date().unwrap_or("-"),
            ),
            TickerOutcome::Skipped(reason) => println!("{:<8} skipped  {}", ticker, reason),
        }
    }

    info!("✓ {} cached, {} skipped", report.cached(), report.skipped());
    Ok(())
}
