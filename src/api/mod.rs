//! HTTP API
//!
//! This module exposes the orchestrator over JSON:
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | GET | `/ping` | 200 `{"message": "pong"}` |
//! | GET | `/api/urls` | 200 records, id ascending |
//! | GET | `/api/urls/{id}` | 200 record |
//! | POST | `/api/urls` | 201 `{id}`, 409 `{id, error}` if known |
//! | POST | `/api/urls/{id}/crawl` | 202 `{id, status}` |
//! | POST | `/api/urls/crawl` | 202 / 207 `{triggered, errors}` |
//! | GET | `/api/stats` | 200 `{total, by_status}` |
//!
//! The orchestrator is expected as `web::Data<Orchestrator>` app data.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{BulkCrawlRequest, SubmitRequest};

use actix_web::middleware::DefaultHeaders;
use actix_web::{guard, web};

/// Registers every route, the extractor error handlers and the 404 fallback
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(format!("Invalid URL ID: {}", err)).into()),
    )
    // Must stay first: the guard lets every other method fall through
    .service(
        web::resource("/{tail:.*}")
            .guard(guard::Options())
            .to(handlers::preflight),
    )
    .service(handlers::ping)
    .service(handlers::list_urls)
    .service(handlers::bulk_crawl)
    .service(handlers::get_url)
    .service(handlers::submit_url)
    .service(handlers::trigger_crawl)
    .service(handlers::stats)
    .default_service(web::to(handlers::not_found));
}

/// CORS headers added to every response
pub fn cors_headers(allowed_origin: &str) -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", allowed_origin.to_string()))
        .add(("Access-Control-Allow-Credentials", "true"))
        .add((
            "Access-Control-Allow-Headers",
            "Content-Type, Content-Length, Accept-Encoding, Authorization, Accept, Origin, Cache-Control, X-Requested-With",
        ))
        .add(("Access-Control-Allow-Methods", "POST, OPTIONS, GET, PUT, DELETE"))
}
