//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::catalog_store::{CatalogError, QueryError};
use crate::name_resolution::ResolutionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CatalogError::Conflict(msg) => ApiError::Conflict(msg),
            CatalogError::UnknownPerson(_) => ApiError::BadRequest(err.to_string()),
            CatalogError::Database(_) => ApiError::Internal("Catalog storage failure".to_string()),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::BlankName => ApiError::BadRequest(err.to_string()),
            ResolutionError::Catalog(e) => e.into(),
        }
    }
}

/// Logs a failed catalog operation where it happened, then converts it.
///
/// Database failures are errors; everything else is an expected outcome of
/// the request and only logged at debug level.
pub trait LogContext<T> {
    fn log_context(self, context: &str) -> ApiResult<T>;
}

impl<T> LogContext<T> for Result<T, CatalogError> {
    fn log_context(self, context: &str) -> ApiResult<T> {
        self.map_err(|err| {
            match &err {
                CatalogError::Database(e) => error!("{}: {}", context, e),
                other => debug!("{}: {}", context, other),
            }
            err.into()
        })
    }
}

impl<T> LogContext<T> for Result<T, ResolutionError> {
    fn log_context(self, context: &str) -> ApiResult<T> {
        match self {
            Ok(value) => Ok(value),
            Err(ResolutionError::Catalog(e)) => Err::<T, CatalogError>(e).log_context(context),
            Err(blank) => {
                debug!("{}: {}", context, blank);
                Err(blank.into())
            }
        }
    }
}
