//! Tests for the client-credentials token exchange.
//!
//! Uses wiremock to stand in for the Veracross accounts host.

use serde_json::json;
use veracross::{Config, Request, Scopes, VeracrossClient, VeracrossError};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/demo/oauth/token";

fn config_for(mock_server: &MockServer) -> Config {
    Config::new(
        "demo",
        "client-id",
        "client-secret",
        Scopes::parse("students:list students:read"),
    )
    .with_api_host(mock_server.uri())
    .with_auth_host(mock_server.uri())
}

#[tokio::test]
async fn test_token_is_acquired_and_used() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-id"))
        .and(body_string_contains("client_secret=client-secret"))
        .and(body_string_contains("scope=students%3Alist+students%3Aread"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "issued-token",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "students:list students:read"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/demo/v3/students/7"))
        .and(header("authorization", "Bearer issued-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": 7, "first_name": "Ada"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VeracrossClient::connect(&config_for(&mock_server))
        .await
        .expect("connect should succeed");

    let credential = client.credential().expect("token should be set");
    assert_eq!(credential.access_token(), "issued-token");
    assert_eq!(credential.expires_in(), Some(3600));
    assert_eq!(credential.granted_scope(), Some("students:list students:read"));

    let student = client
        .try_call("students.read", &Request::new().id(7))
        .await
        .unwrap();
    assert_eq!(student.rows()[0]["first_name"], "Ada");
}

#[tokio::test]
async fn test_response_without_access_token_leaves_token_unset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error_description": "The requested scope is invalid"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VeracrossClient::connect(&config_for(&mock_server))
        .await
        .expect("a rejected token request must not fail construction");

    assert!(client.credential().is_none());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_rejected_credentials_then_calls_come_back_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Client authentication failed"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/demo/v3/students"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VeracrossClient::connect(&config_for(&mock_server))
        .await
        .unwrap();
    assert!(client.credential().is_none());

    let students = client.call("students.list", &Request::new()).await;
    assert!(students.is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    let api_request = requests
        .iter()
        .find(|r| r.url.path() == "/demo/v3/students")
        .unwrap();
    assert!(api_request.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_non_json_error_body_leaves_token_unset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = VeracrossClient::connect(&config_for(&mock_server))
        .await
        .unwrap();
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_non_json_success_body_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let result = VeracrossClient::connect(&config_for(&mock_server)).await;
    assert!(matches!(result, Err(VeracrossError::ParseError(_))));
}

#[tokio::test]
async fn test_empty_scope_list_omits_scope_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Config::new("demo", "id", "secret", Scopes::new())
        .with_auth_host(mock_server.uri());
    let client = VeracrossClient::connect(&config).await.unwrap();
    assert!(client.is_authenticated());

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("scope="));
}
