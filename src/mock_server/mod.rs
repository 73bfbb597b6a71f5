//! Mock Veracross API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the
//! Veracross token endpoint and v3 API for integration and end-to-end
//! testing. Unlike wiremock which mocks at the HTTP level per-test, this
//! server maintains state across requests, enabling realistic workflow
//! testing.
//!
//! # Example
//!
//! ```ignore
//! use veracross::mock_server::MockServer;
//! use veracross::{Request, Scopes, VeracrossClient};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = VeracrossClient::connect(&server.config(Scopes::parse("students:list")))
//!         .await
//!         .unwrap();
//!
//!     // Server comes with default fixtures
//!     let students = client.call("students.list", &Request::new()).await;
//!     assert_eq!(students.len(), 3);
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures, MOCK_CLIENT_ID, MOCK_CLIENT_SECRET, MOCK_ROUTE};
pub use server::MockServer;
pub use state::{MockState, MOCK_ACCESS_TOKEN};
