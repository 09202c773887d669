// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    NotFound,
    InvalidTicker,
    Cache,
    Refresh,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    pub fn invalid_ticker(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidTicker, message)
    }

    pub fn cache_error(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Cache, message)
    }

    pub fn refresh_error(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Refresh, message)
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::NotFound => StatusCode::NOT_FOUND,
            ApiErrorKind::InvalidTicker => StatusCode::BAD_REQUEST,
            ApiErrorKind::Cache | ApiErrorKind::Refresh => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
