//! HTTP error responses
//!
//! Every error leaves the API as `{"error": "..."}` with a status derived
//! from the crate error that caused it.

use crate::PagescopeError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl From<PagescopeError> for ApiError {
    fn from(error: PagescopeError) -> Self {
        match error {
            PagescopeError::Url(e) => Self::BadRequest(format!("Invalid URL: {}", e)),
            PagescopeError::NotFound(_) => Self::NotFound("URL not found".to_string()),
            PagescopeError::CrawlAlreadyRunning(_) => {
                Self::Conflict("Crawl already running for this URL".to_string())
            }
            other => {
                tracing::error!("Request failed: {}", other);
                Self::Internal
            }
        }
    }
}
