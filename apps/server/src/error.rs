use std::io::Error as IoError;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use hostpulse::RegisterError;
use thiserror::Error;

/// Startup-level failures
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] hostpulse::config::Error),
    #[error("Database error: {0:#}")]
    Database(anyhow::Error),
}

/// Failures surfaced to API callers as structured JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing 'host' parameter")]
    MissingParam,
    #[error("invalid host: {0}")]
    InvalidHost(String),
    #[error("not reachable")]
    NotReachable,
    #[error("no data for host {0}")]
    NotFound(String),
    #[error("session required")]
    Unauthorized,
    #[error("store unavailable")]
    Store(#[source] anyhow::Error),
}

impl From<RegisterError> for ApiError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::InvalidHost(msg) => ApiError::InvalidHost(msg),
            RegisterError::NotReachable => ApiError::NotReachable,
            RegisterError::Store(err) => ApiError::Store(err),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingParam | ApiError::InvalidHost(_) => StatusCode::BAD_REQUEST,
            ApiError::NotReachable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
