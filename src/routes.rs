// src/routes.rs
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reject::Rejection;
use crate::handlers::dividends::{get_dividend_value, get_ex_date, get_payment_date, trigger_refresh};
use crate::state::AppState;
use log::info;

use std::convert::Infallible;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status(), api_error.message.clone())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let value_route = warp::path!("dividendos" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_dividend_value);

    let ex_date_route = warp::path!("dividendos" / "data" / "com" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_ex_date);

    let payment_date_route = warp::path!("dividendos" / "data" / "pgto" / String)
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_payment_date);

    let refresh_route = warp::path!("dividendos")
        .and(warp::get())
        .and(state_filter)
        .and_then(trigger_refresh);

    info!("All routes configured successfully.");

    value_route
        .or(ex_date_route)
        .or(payment_date_route)
        .or(refresh_route)
        .recover(handle_rejection)
}
