//! Mock Veracross API server.
//!
//! Provides an axum-based HTTP server that simulates both the Veracross
//! token endpoint and the v3 API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures, MOCK_CLIENT_ID, MOCK_CLIENT_SECRET, MOCK_ROUTE};
use super::handlers;
use super::state::MockState;
use crate::{Config, Scopes};

/// A mock Veracross server for testing.
///
/// The server runs in the background and serves the token endpoint at
/// `/{route}/oauth/token` and the API at `/{route}/v3/...`, so one URL can
/// be used as both the API host and the auth host.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available. The
    /// default OAuth client is still registered.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new().with_client(MOCK_CLIENT_ID, MOCK_CLIENT_SECRET)).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// A client configuration pointing at this server with the default
    /// route and OAuth client.
    pub fn config(&self, scopes: Scopes) -> Config {
        Config::new(MOCK_ROUTE, MOCK_CLIENT_ID, MOCK_CLIENT_SECRET, scopes)
            .with_api_host(self.url.as_str())
            .with_auth_host(self.url.as_str())
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Number of API requests received so far, token requests excluded.
    pub async fn api_requests(&self) -> usize {
        self.state.read().await.api_requests
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new().with_client(scenario.client_id, scenario.client_secret);

        for (path, records) in scenario.collections {
            state = state.with_records(path, records);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // OAuth
            .route("/:route/oauth/token", post(handlers::issue_token))
            // API
            .route(
                "/:route/v3/*path",
                get(handlers::read_resource)
                    .post(handlers::create_resource)
                    .patch(handlers::update_resource)
                    .delete(handlers::delete_resource),
            )
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
