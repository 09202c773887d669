// src/bin/check_api.rs
use fii_dividends::config::AppConfig;
use reqwest::Client;
use log::{info, warn};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let base_url = &config.api_base_url;
    info!("Checking dividend API at {}", base_url);

    let client = Client::new();
    let mut missing = 0;

    for ticker in &config.refresh.tickers {
        for (label, path) in [
            ("VALOR", format!("dividendos/{}", ticker)),
            ("DATA COM", format!("dividendos/data/com/{}", ticker)),
            ("PAGAMENTO", format!("dividendos/data/pgto/{}", ticker)),
        ] {
            let resp = client.get(format!("{}/{}", base_url, path)).send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            if status.is_success() {
                info!("{} {}: {}", ticker, label, body);
            } else {
                warn!("{} {}: {} {}", ticker, label, status, body);
                missing += 1;
            }
        }
    }

    info!("Done: {} lookups without data", missing);
    Ok(())
}
