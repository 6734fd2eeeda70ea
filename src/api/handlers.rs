//! Route handlers

use crate::api::error::ApiError;
use crate::crawler::Orchestrator;
use crate::state::CrawlStatus;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkCrawlRequest {
    pub ids: Vec<i64>,
}

#[get("/ping")]
pub async fn ping() -> impl Responder {
    web::Json(json!({ "message": "pong" }))
}

#[get("/api/urls")]
pub async fn list_urls(orchestrator: web::Data<Orchestrator>) -> Result<HttpResponse, ApiError> {
    let records = orchestrator.list_records()?;
    Ok(HttpResponse::Ok().json(records))
}

#[get("/api/urls/{id}")]
pub async fn get_url(
    orchestrator: web::Data<Orchestrator>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let record = orchestrator.get_record(path.into_inner())?;
    Ok(HttpResponse::Ok().json(record))
}

/// 201 `{id}` for a new URL, 409 `{id, error}` for a known one
#[post("/api/urls")]
pub async fn submit_url(
    orchestrator: web::Data<Orchestrator>,
    payload: web::Json<SubmitRequest>,
) -> Result<HttpResponse, ApiError> {
    let submission = orchestrator.submit_url(&payload.url)?;

    if submission.created {
        Ok(HttpResponse::Created().json(json!({ "id": submission.record.id })))
    } else {
        Ok(HttpResponse::Conflict().json(json!({
            "id": submission.record.id,
            "error": "URL already exists",
        })))
    }
}

#[post("/api/urls/{id}/crawl")]
pub async fn trigger_crawl(
    orchestrator: web::Data<Orchestrator>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let record = orchestrator.request_crawl(path.into_inner())?;
    Ok(HttpResponse::Accepted().json(json!({
        "id": record.id,
        "status": CrawlStatus::Running,
    })))
}

/// 202 when every crawl started, 207 when some ids were rejected
#[post("/api/urls/crawl")]
pub async fn bulk_crawl(
    orchestrator: web::Data<Orchestrator>,
    payload: web::Json<BulkCrawlRequest>,
) -> Result<HttpResponse, ApiError> {
    if payload.ids.is_empty() {
        return Err(ApiError::BadRequest(
            "No IDs provided for bulk crawl".to_string(),
        ));
    }

    let outcome = orchestrator.request_bulk_crawl(&payload.ids);
    let status = if outcome.errors.is_empty() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::MULTI_STATUS
    };

    Ok(HttpResponse::build(status).json(json!({
        "triggered": outcome.triggered.len(),
        "errors": outcome.errors,
    })))
}

#[get("/api/stats")]
pub async fn stats(orchestrator: web::Data<Orchestrator>) -> Result<HttpResponse, ApiError> {
    let stats = orchestrator.statistics()?;
    Ok(HttpResponse::Ok().json(stats))
}

/// CORS preflight
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound("route not found".to_string()))
}
