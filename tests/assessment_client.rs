//! Integration tests for SslLabsClient using wiremock

use std::time::Duration;

use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tls_verdict::{AssessmentClient, ScanError, SslLabsClient};

fn client_for(server: &MockServer) -> SslLabsClient {
    SslLabsClient::new(&format!("{}/api/v2/", server.uri()), Duration::from_secs(5)).unwrap()
}

/// Starting an assessment asks for a fresh run
#[tokio::test]
async fn test_start_assessment_requests_new_run() {
    let mock_server = MockServer::start().await;
    let body = serde_json::json!({"host": "example.com", "status": "DNS"});

    Mock::given(method("GET"))
        .and(path("/api/v2/analyze"))
        .and(query_param("host", "example.com"))
        .and(query_param("publish", "off"))
        .and(query_param("all", "done"))
        .and(query_param("ignoreMismatch", "on"))
        .and(query_param("startNew", "on"))
        .and(query_param_is_missing("fromCache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let raw = client_for(&mock_server).start_assessment("example.com").await.unwrap();

    let parsed: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(parsed, body);
}

/// Polling reads the cached assessment
#[tokio::test]
async fn test_poll_assessment_uses_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/analyze"))
        .and(query_param("fromCache", "on"))
        .and(query_param_is_missing("startNew"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"IN_PROGRESS"}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let raw = client_for(&mock_server).poll_assessment("example.com").await.unwrap();

    assert_eq!(raw, br#"{"status":"IN_PROGRESS"}"#.to_vec());
}

/// Non-2xx answers are transport errors
#[tokio::test]
async fn test_http_error_status_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(529).set_body_json(serde_json::json!({
            "errors": [{"message": "Service is overloaded"}]
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).poll_assessment("example.com").await.unwrap_err();

    assert!(matches!(err, ScanError::Transport(_)));
    assert!(err.to_string().contains("529"));
}

/// Requests that outlive the timeout fail instead of hanging
#[tokio::test]
async fn test_request_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&mock_server)
        .await;

    let client = SslLabsClient::new(&mock_server.uri(), Duration::from_millis(200)).unwrap();
    let result = client.start_assessment("example.com").await;

    assert!(matches!(result, Err(ScanError::Transport(_))));
}
