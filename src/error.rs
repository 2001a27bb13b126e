use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationError;

use crate::{
    dao::{source::FetchError, storage::StorageError},
    imaging::quantize::QuantizeError,
};

/// Message returned when the `url` query parameter is missing or blank.
pub const INVALID_URL_MESSAGE: &str = "url is not valid";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The source URL is missing or blank.
    #[error("url is not valid")]
    InvalidUrl,
    /// The source image could not be fetched or decoded.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The quantizer could not produce enough colors.
    #[error(transparent)]
    PaletteExtraction(#[from] QuantizeError),
    /// The generated file could not be persisted.
    #[error(transparent)]
    Write(#[from] StorageError),
    /// A worker task failed unexpectedly.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ServiceError {
    fn from(_: ValidationError) -> Self {
        ServiceError::InvalidUrl
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Upstream answered badly or sent something unusable.
    #[error("bad gateway: {0}")]
    BadGateway(String),
    /// Upstream did not answer in time.
    #[error("gateway timeout: {0}")]
    GatewayTimeout(String),
    /// Input was well formed but cannot be processed.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidUrl => AppError::BadRequest(INVALID_URL_MESSAGE.into()),
            ServiceError::Fetch(FetchError::Timeout { url }) => AppError::GatewayTimeout(url),
            ServiceError::Fetch(source) => AppError::BadGateway(source.to_string()),
            ServiceError::PaletteExtraction(source) => AppError::Unprocessable(source.to_string()),
            ServiceError::Write(source) => AppError::Internal(source.to_string()),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
