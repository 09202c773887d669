// src/handlers/dividends.rs
use warp::reply::Json;
use warp::{Rejection, Reply};
use std::sync::Arc;
use log::{error, info};

use crate::models::{DividendField, Ticker};
use crate::services::refresh::refresh_dividends;
use crate::state::AppState;
use super::error::ApiError;

pub async fn get_dividend_value(code: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    get_dividend_field(code, state, DividendField::Value).await
}

pub async fn get_ex_date(code: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    get_dividend_field(code, state, DividendField::ExDate).await
}

pub async fn get_payment_date(code: String, state: Arc<AppState>) -> Result<impl Reply, Rejection> {
    get_dividend_field(code, state, DividendField::PaymentDate).await
}

async fn get_dividend_field(
    code: String,
    state: Arc<AppState>,
    field: DividendField,
) -> Result<String, Rejection> {
    let ticker = Ticker::parse(&code)
        .map_err(|e| warp::reject::custom(ApiError::invalid_ticker(e)))?;
    info!("Handling request for {} of {}", field, ticker);

    let record = state.cache.load(&ticker).await
        .map_err(|e| {
            error!("Failed to read cached dividends for {}: {}", ticker, e);
            warp::reject::custom(ApiError::cache_error(e.to_string()))
        })?
        .ok_or_else(|| {
            warp::reject::custom(ApiError::not_found(format!(
                "No dividend information found for {}", ticker
            )))
        })?;

    field
        .read(&record)
        .map(str::to_string)
        .ok_or_else(|| {
            warp::reject::custom(ApiError::not_found(format!(
                "No dividend {} found for {}", field, ticker
            )))
        })
}

pub async fn trigger_refresh(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to refresh dividend cache");

    match refresh_dividends(state.launcher.as_ref(), &state.cache, &state.refresh).await {
        Ok(report) => {
            info!("Refresh attempted: {} cached, {} skipped", report.cached(), report.skipped());
            Ok(warp::reply::json(&true))
        }
        Err(e) => {
            error!("Dividend refresh could not start: {}", e);
            Err(warp::reject::custom(ApiError::refresh_error(format!(
                "Failed to launch browser: {}", e
            ))))
        }
    }
}
