//! Execution tests for the paginated fetcher.
//!
//! Uses wiremock to mock the Veracross API and check the page headers the
//! client sends and how the loop ends.

use serde_json::{json, Value};
use veracross::{
    fetch_all, Config, Credential, Halt, Request, Scopes, Table, VeracrossClient,
    PAGE_NUMBER_HEADER, PAGE_SIZE_HEADER,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STUDENTS_PATH: &str = "/demo/v3/students";

fn client_for(mock_server: &MockServer) -> VeracrossClient {
    let config = Config::new("demo", "id", "secret", Scopes::parse("students:list"))
        .with_api_host(mock_server.uri());
    VeracrossClient::with_credential(&config, Some(Credential::bearer("test-token"))).unwrap()
}

fn page_body(ids: &[u64]) -> Value {
    let rows: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "first_name": format!("Student {id}")}))
        .collect();
    json!({ "data": rows })
}

async fn mount_page(mock_server: &MockServer, page: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(STUDENTS_PATH))
        .and(header(PAGE_NUMBER_HEADER, page))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_pages_concatenate_until_empty_page() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "1", page_body(&[1, 2])).await;
    mount_page(&mock_server, "2", page_body(&[3])).await;
    mount_page(&mock_server, "3", page_body(&[])).await;

    let client = client_for(&mock_server);
    let fetched = fetch_all(&client, "students", &Request::new())
        .await
        .unwrap();

    assert_eq!(fetched.requests, 3);
    assert_eq!(fetched.halt, Halt::Exhausted);
    let expected = Table::from_value(json!([
        {"id": 1, "first_name": "Student 1"},
        {"id": 2, "first_name": "Student 2"},
        {"id": 3, "first_name": "Student 3"}
    ]))
    .unwrap();
    assert_eq!(fetched.table, expected);

    let requests = mock_server.received_requests().await.unwrap();
    let pages: Vec<_> = requests
        .iter()
        .map(|r| {
            r.headers
                .get(PAGE_NUMBER_HEADER)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(pages, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_first_page_failure_returns_empty_after_one_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDENTS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let fetched = fetch_all(&client, "students", &Request::new())
        .await
        .unwrap();

    assert!(fetched.table.is_empty());
    assert_eq!(fetched.requests, 1);
    assert_eq!(fetched.halt, Halt::Status(401));
    assert!(!fetched.is_complete());
}

#[tokio::test]
async fn test_failure_mid_listing_keeps_earlier_pages() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "1", page_body(&[1, 2])).await;

    Mock::given(method("GET"))
        .and(path(STUDENTS_PATH))
        .and(header(PAGE_NUMBER_HEADER, "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let fetched = fetch_all(&client, "students", &Request::new())
        .await
        .unwrap();

    assert_eq!(fetched.table.len(), 2);
    assert_eq!(fetched.requests, 2);
    assert_eq!(fetched.halt, Halt::Status(500));
}

#[tokio::test]
async fn test_default_and_overridden_page_size() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDENTS_PATH))
        .and(header(PAGE_SIZE_HEADER, "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(STUDENTS_PATH))
        .and(header(PAGE_SIZE_HEADER, "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    fetch_all(&client, "students", &Request::new()).await.unwrap();
    fetch_all(&client, "students", &Request::new().page_size(25))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_start_page_and_page_limit() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "4", page_body(&[40])).await;
    mount_page(&mock_server, "5", page_body(&[50])).await;

    let client = client_for(&mock_server);
    let request = Request::new().start_page(4).max_pages(2);
    let fetched = fetch_all(&client, "students", &request).await.unwrap();

    assert_eq!(fetched.requests, 2);
    assert_eq!(fetched.halt, Halt::PageLimit);
    let ids: Vec<_> = fetched.table.column("id").flatten().cloned().collect();
    assert_eq!(ids, vec![json!(40), json!(50)]);
}

#[tokio::test]
async fn test_single_object_data_stops_after_one_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 1}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let fetched = fetch_all(&client, "students", &Request::new())
        .await
        .unwrap();

    assert_eq!(fetched.table.len(), 1);
    assert!(fetched.is_complete());
}

#[tokio::test]
async fn test_undecodable_page_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STUDENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = fetch_all(&client, "students", &Request::new()).await;

    assert!(matches!(result, Err(veracross::VeracrossError::ParseError(_))));
}
