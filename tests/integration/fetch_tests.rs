//! Integration tests for the fetcher
//!
//! These tests use wiremock to check status, redirect and timeout
//! classification against a real HTTP exchange.

mod common;

use common::create_test_config;
use pagescope::crawler::{build_http_client, fetch_page, FetchError};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><title>Hi</title></html>", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
    let page = fetch_page(&client, &format!("{}/", mock_server.uri()))
        .await
        .expect("Fetch should succeed");

    assert_eq!(page.status_code, 200);
    assert!(page.content_type.starts_with("text/html"));
    assert!(page.body.contains("<title>Hi</title>"));
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let client = build_http_client(&config.user_agent, &config.crawler).unwrap();

    assert!(fetch_page(&client, &mock_server.uri()).await.is_ok());
}

#[tokio::test]
async fn test_fetch_error_statuses() {
    let mock_server = MockServer::start().await;

    for (route, code) in [("/missing", 404u16), ("/broken", 500), ("/forbidden", 403)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(code))
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config();
    let client = build_http_client(&config.user_agent, &config.crawler).unwrap();

    for (route, code) in [("/missing", 404u16), ("/broken", 500), ("/forbidden", 403)] {
        let result = fetch_page(&client, &format!("{}{}", mock_server.uri(), route)).await;
        assert_eq!(result.unwrap_err(), FetchError::HttpStatus(code), "{}", route);
    }
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
    let page = fetch_page(&client, &format!("{}/old", mock_server.uri()))
        .await
        .expect("Redirect should be followed");

    assert!(page.final_url.ends_with("/new"));
    assert_eq!(page.body, "moved");
}

#[tokio::test]
async fn test_fetch_too_many_redirects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
    let result = fetch_page(&client, &format!("{}/loop", mock_server.uri())).await;

    assert_eq!(result.unwrap_err(), FetchError::TooManyRedirects);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.page_timeout = 1;
    let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
    let result = fetch_page(&client, &mock_server.uri()).await;

    assert_eq!(result.unwrap_err(), FetchError::Timeout);
}

#[tokio::test]
async fn test_fetch_timeout_while_reading_body() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Headers arrive at once, the promised body never completes
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 100\r\n\r\n<html>",
            )
            .await;
        let _ = socket.flush().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let mut config = create_test_config();
    config.crawler.page_timeout = 1;
    let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
    let result = fetch_page(&client, &format!("http://{}/", addr)).await;

    assert_eq!(result.unwrap_err(), FetchError::Timeout);
}
