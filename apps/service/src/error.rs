use std::io::Error as IoError;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Errors that can stop the process before it is meaningfully running.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors surfaced to API clients. Store failures become a 500; probe
/// failures never reach this type because "down" is data, not an error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
