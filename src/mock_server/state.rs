//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Veracross API server.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::Record;

/// Token issued by the mock token endpoint unless overridden.
pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";

/// Shared state for the mock server.
///
/// Holds the records served for each collection path plus the OAuth clients
/// the token endpoint accepts. It's wrapped in `Arc<RwLock<_>>` for
/// concurrent access.
#[derive(Debug)]
pub struct MockState {
    /// Records indexed by collection path (e.g., "academics/classes").
    pub collections: HashMap<String, Vec<Record>>,

    /// Registered OAuth clients, client id to secret.
    pub clients: HashMap<String, String>,

    /// Access token handed out by the token endpoint.
    pub issued_token: String,

    /// Optional authentication token. If set, API requests must include it.
    pub required_token: Option<String>,

    /// Number of API requests received, token requests excluded.
    pub api_requests: usize,

    next_id: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
            clients: HashMap::new(),
            issued_token: MOCK_ACCESS_TOKEN.to_string(),
            required_token: None,
            api_requests: 0,
            next_id: 1000,
        }
    }
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Register an OAuth client.
    pub fn with_client(mut self, client_id: &str, client_secret: &str) -> Self {
        self.clients
            .insert(client_id.to_string(), client_secret.to_string());
        self
    }

    /// Add records to a collection, creating it if needed.
    pub fn with_records(mut self, path: &str, records: Vec<Record>) -> Self {
        self.collections
            .entry(path.to_string())
            .or_default()
            .extend(records);
        self
    }

    /// Set the required authentication token.
    pub fn with_required_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Whether an `Authorization` header value is acceptable.
    pub fn authorizes(&self, authorization: Option<&str>) -> bool {
        match &self.required_token {
            Some(token) => authorization == Some(format!("Bearer {token}").as_str()),
            None => true,
        }
    }

    /// Whether the client id and secret match a registered client.
    pub fn accepts_client(&self, client_id: &str, client_secret: &str) -> bool {
        self.clients
            .get(client_id)
            .is_some_and(|secret| secret == client_secret)
    }

    /// Get all records of a collection.
    pub fn list(&self, path: &str) -> Option<&[Record]> {
        self.collections.get(path).map(Vec::as_slice)
    }

    /// Get one page of a collection (1-indexed).
    pub fn page(&self, path: &str, page: usize, size: usize) -> Option<Vec<Record>> {
        let records = self.list(path)?;
        let start = page.saturating_sub(1).saturating_mul(size);
        Some(records.iter().skip(start).take(size).cloned().collect())
    }

    /// Get a record by collection path and id.
    pub fn find(&self, path: &str, id: &str) -> Option<&Record> {
        self.collections
            .get(path)?
            .iter()
            .find(|record| id_matches(record, id))
    }

    /// Insert a record, assigning an id when it has none.
    pub fn insert(&mut self, path: &str, mut record: Record) -> Record {
        if !record.contains_key("id") {
            self.next_id += 1;
            record.insert("id".to_string(), Value::from(self.next_id));
        }
        self.collections
            .entry(path.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    /// Merge fields into an existing record.
    pub fn update(&mut self, path: &str, id: &str, fields: Record) -> Option<Record> {
        let record = self
            .collections
            .get_mut(path)?
            .iter_mut()
            .find(|record| id_matches(record, id))?;

        for (key, value) in fields {
            if key != "id" {
                record.insert(key, value);
            }
        }
        Some(record.clone())
    }

    /// Remove a record. Returns false if it did not exist.
    pub fn remove(&mut self, path: &str, id: &str) -> bool {
        match self.collections.get_mut(path) {
            Some(records) => {
                let before = records.len();
                records.retain(|record| !id_matches(record, id));
                records.len() != before
            }
            None => false,
        }
    }
}

fn id_matches(record: &Record, id: &str) -> bool {
    match record.get("id") {
        Some(Value::Number(n)) => n.to_string() == id,
        Some(Value::String(s)) => s == id,
        _ => false,
    }
}
