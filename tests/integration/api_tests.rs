//! Integration tests for the HTTP API
//!
//! Requests go through the full actix-web service built from
//! `api::configure`, with CORS headers wrapped the way the binary does it.

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::{create_orchestrator, create_test_config};
use pagescope::api::{configure, cors_headers};
use pagescope::crawler::Orchestrator;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORIGIN: &str = "http://localhost:3000";

macro_rules! init_app {
    ($orchestrator:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($orchestrator))
                .wrap(cors_headers(ORIGIN))
                .configure(configure),
        )
        .await
    };
}

fn orchestrator() -> Orchestrator {
    create_orchestrator(&create_test_config())
}

#[actix_web::test]
async fn test_ping() {
    let app = init_app!(orchestrator());

    let req = test::TestRequest::get().uri("/ping").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "message": "pong" }));
}

#[actix_web::test]
async fn test_submit_then_duplicate() {
    let app = init_app!(orchestrator());

    let req = test::TestRequest::post()
        .uri("/api/urls")
        .set_json(json!({ "url": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().expect("id should be an integer");

    let req = test::TestRequest::post()
        .uri("/api/urls")
        .set_json(json!({ "url": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let conflict: Value = test::read_body_json(resp).await;
    assert_eq!(conflict["id"], id);
    assert!(conflict["error"].is_string());
}

#[actix_web::test]
async fn test_submit_invalid_url() {
    let app = init_app!(orchestrator());

    for url in ["", "not a url", "ftp://example.com/file", "http://"] {
        let req = test::TestRequest::post()
            .uri("/api/urls")
            .set_json(json!({ "url": url }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{:?}", url);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    let req = test::TestRequest::get().uri("/api/urls").to_request();
    let records: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(records, json!([]));
}

#[actix_web::test]
async fn test_submit_malformed_body() {
    let app = init_app!(orchestrator());

    let req = test::TestRequest::post()
        .uri("/api/urls")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/urls")
        .set_json(json!({ "link": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_list_and_get_records() {
    let orchestrator = orchestrator();
    let first = orchestrator.submit_url("https://a.example.com").unwrap().record.id;
    let second = orchestrator.submit_url("https://b.example.com").unwrap().record.id;
    let app = init_app!(orchestrator);

    let req = test::TestRequest::get().uri("/api/urls").to_request();
    let records: Value = test::call_and_read_body_json(&app, req).await;
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], first);
    assert_eq!(records[1]["id"], second);

    let req = test::TestRequest::get()
        .uri(&format!("/api/urls/{}", second))
        .to_request();
    let record: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(record["url"], "https://b.example.com");
    assert_eq!(record["status"], "queued");
    assert_eq!(
        record["heading_counts"],
        json!({ "h1": 0, "h2": 0, "h3": 0, "h4": 0, "h5": 0, "h6": 0 })
    );
    assert_eq!(record["inaccessible_links"], json!([]));
    assert_eq!(record["has_login_form"], false);
    assert!(record.get("error_message").is_none());
}

#[actix_web::test]
async fn test_get_unknown_and_invalid_id() {
    let app = init_app!(orchestrator());

    let req = test::TestRequest::get().uri("/api/urls/404").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let req = test::TestRequest::get().uri("/api/urls/abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_trigger_crawl_and_conflict() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<title>Slow</title>", "text/html")
                .set_delay(Duration::from_secs(1)),
        )
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator();
    let id = orchestrator.submit_url(&mock_server.uri()).unwrap().record.id;
    let app = init_app!(orchestrator.clone());

    let req = test::TestRequest::post()
        .uri(&format!("/api/urls/{}/crawl", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "id": id, "status": "running" }));

    let req = test::TestRequest::post()
        .uri(&format!("/api/urls/{}/crawl", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let finished = common::wait_for_finish(&orchestrator, id, Duration::from_secs(10)).await;
    assert_eq!(finished.page_title, "Slow");
}

#[actix_web::test]
async fn test_trigger_crawl_unknown_id() {
    let app = init_app!(orchestrator());

    let req = test::TestRequest::post()
        .uri("/api/urls/77/crawl")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_bulk_crawl() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<title>Bulk</title>", "text/html")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator();
    let a = orchestrator
        .submit_url(&format!("{}/a", mock_server.uri()))
        .unwrap()
        .record
        .id;
    let b = orchestrator
        .submit_url(&format!("{}/b", mock_server.uri()))
        .unwrap()
        .record
        .id;
    let app = init_app!(orchestrator.clone());

    let req = test::TestRequest::post()
        .uri("/api/urls/crawl")
        .set_json(json!({ "ids": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/urls/crawl")
        .set_json(json!({ "ids": [a] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["triggered"], 1);
    assert_eq!(body["errors"], json!([]));

    // `a` is still running, 999 does not exist
    let req = test::TestRequest::post()
        .uri("/api/urls/crawl")
        .set_json(json!({ "ids": [a, b, 999] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MULTI_STATUS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["triggered"], 1);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_stats() {
    let orchestrator = orchestrator();
    orchestrator.submit_url("https://a.example.com").unwrap();
    let id = orchestrator.submit_url("https://b.example.com").unwrap().record.id;
    orchestrator.start_crawl(id).unwrap();
    let app = init_app!(orchestrator);

    let req = test::TestRequest::get().uri("/api/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total"], 2);
    assert_eq!(body["by_status"]["queued"], 1);
    assert_eq!(body["by_status"]["running"], 1);
    assert_eq!(body["by_status"]["done"], 0);
    assert_eq!(body["by_status"]["error"], 0);
}

#[actix_web::test]
async fn test_cors_headers_and_preflight() {
    let app = init_app!(orchestrator());

    let req = test::TestRequest::get().uri("/api/urls").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        ORIGIN
    );
    assert_eq!(
        resp.headers().get("access-control-allow-credentials").unwrap(),
        "true"
    );

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/urls")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(resp.headers().contains_key("access-control-allow-methods"));
}

#[actix_web::test]
async fn test_unknown_route() {
    let app = init_app!(orchestrator());

    let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}
