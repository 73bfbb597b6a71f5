//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use serde_json::{json, Value};

use crate::Record;

/// School route served by the default scenario.
pub const MOCK_ROUTE: &str = "mock_school";
/// OAuth client id registered in the default scenario.
pub const MOCK_CLIENT_ID: &str = "test-client";
/// OAuth client secret registered in the default scenario.
pub const MOCK_CLIENT_SECRET: &str = "test-secret";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    // =========================================================================
    // People
    // =========================================================================

    /// Create a student record.
    pub fn student(id: u64, first_name: &str, last_name: &str, grade_level: u32) -> Record {
        Self::record(json!({
            "id": id,
            "first_name": first_name,
            "last_name": last_name,
            "grade_level": {"id": grade_level, "description": format!("Grade {grade_level}")},
            "household_id": 500 + id,
        }))
    }

    /// Create a household record with a nested address.
    pub fn household(id: u64, name: &str, city: &str) -> Record {
        Self::record(json!({
            "id": id,
            "name": name,
            "address": {"city": city, "state": "MA", "postal_code": "02139"},
        }))
    }

    // =========================================================================
    // Academics
    // =========================================================================

    /// Create a class record with nested course and school year.
    pub fn class(id: u64, name: &str, course: &str) -> Record {
        Self::record(json!({
            "id": id,
            "description": name,
            "course": {"id": id * 10, "name": course},
            "school_year": {"id": 2024, "description": "2024-2025"},
            "status": "Active",
        }))
    }

    /// Create `count` plain records numbered from 1, for paging tests.
    pub fn numbered(count: u64, label: &str) -> Vec<Record> {
        (1..=count)
            .map(|n| Self::record(json!({"id": n, "name": format!("{label} {n}")})))
            .collect()
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Create a default set of test data for common scenarios.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

/// A complete test scenario: collections plus the registered OAuth client.
pub struct DefaultScenario {
    pub collections: Vec<(&'static str, Vec<Record>)>,
    pub client_id: &'static str,
    pub client_secret: &'static str,
}

impl DefaultScenario {
    fn new() -> Self {
        let students = vec![
            Fixtures::student(1, "Ada", "Lovelace", 9),
            Fixtures::student(2, "Grace", "Hopper", 10),
            Fixtures::student(3, "Alan", "Turing", 9),
        ];

        let households = vec![
            Fixtures::household(501, "Lovelace Household", "Cambridge"),
            Fixtures::household(502, "Hopper Household", "Arlington"),
        ];

        let classes = vec![
            Fixtures::class(11, "Algebra I - A", "Algebra I"),
            Fixtures::class(12, "Biology - B", "Biology"),
        ];

        Self {
            collections: vec![
                ("students", students),
                ("households", households),
                ("academics/classes", classes),
                ("behavior/incidents", Vec::new()),
            ],
            client_id: MOCK_CLIENT_ID,
            client_secret: MOCK_CLIENT_SECRET,
        }
    }
}
