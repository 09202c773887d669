use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use fii_dividends::config::AppConfig;
use fii_dividends::routes;
use fii_dividends::services::browser::ChromeLauncher;
use fii_dividends::services::cache::{DividendCache, RedisStore};
use fii_dividends::state::AppState;
use fii_dividends::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env()?;

    let store = RedisStore::connect(&config.redis_url).await?;
    let state = Arc::new(AppState {
        cache: DividendCache::new(Arc::new(store)),
        launcher: Arc::new(ChromeLauncher::new(config.chrome.clone())),
        refresh: config.refresh.clone(),
    });

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("API listening on {}", addr);
    warp::serve(api)
        .run(addr)
        .await;

    Ok(())
}
