//! Veracross API client library.
//!
//! A Rust library for the Veracross school information system REST API.
//! The client authenticates once with OAuth client credentials, then runs
//! operations from a declarative table: each [`Operation`] names an HTTP
//! verb, a path template, the scope it needs, and whether it is paginated.
//!
//! # Quick Start
//!
//! ```no_run
//! use veracross::{Config, Request, Scopes, VeracrossClient};
//!
//! #[tokio::main]
//! async fn main() -> veracross::Result<()> {
//!     let config = Config::new(
//!         "my_school",
//!         "client-id",
//!         "client-secret",
//!         Scopes::parse("students:list academics.classes:read"),
//!     );
//!     let client = VeracrossClient::connect(&config).await?;
//!
//!     // Every page of students in grade 9
//!     let students = client
//!         .try_call("students.list", &Request::new().query("grade_level", 9))
//!         .await?;
//!     println!("Found {} students", students.len());
//!
//!     // One class, with nested objects expanded into columns
//!     let class = client
//!         .call("academics.classes.read", &Request::new().id(1234))
//!         .await
//!         .flatten(&["course", "school_year"]);
//!     println!("{class}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Error handling
//!
//! [`VeracrossClient::call`] never fails: a missing scope, a transport error
//! or an error status is logged and yields an empty [`Table`].
//! [`VeracrossClient::try_call`] returns the same failures as
//! [`VeracrossError`] values, and [`VeracrossClient::fetch`] additionally
//! reports whether a listing read every page.
//!
//! # Configuration
//!
//! [`Config::from_env`] reads:
//!
//! - `VERACROSS_SCHOOL_ROUTE` (required) - The school's route segment
//! - `VERACROSS_CLIENT_ID` / `VERACROSS_CLIENT_SECRET` (required) - OAuth client
//! - `VERACROSS_SCOPES` (required) - Space- or comma-separated scopes
//! - `VERACROSS_API_HOST` / `VERACROSS_AUTH_HOST` (optional) - Host overrides

mod auth;
mod client;
mod config;
mod error;
pub mod operations;
mod pagination;
mod request;
mod scope;
mod table;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use auth::Credential;
pub use client::{
    VeracrossClient, PAGE_NUMBER_HEADER, PAGE_SIZE_HEADER, REVISION_HEADER, VALUE_LISTS_HEADER,
};
pub use config::{Config, DEFAULT_PAGE_SIZE};
pub use error::{Result, VeracrossError};
pub use pagination::{fetch_all, Fetched, Halt};
pub use request::Request;
pub use scope::Scopes;
pub use table::{Record, Table};

// Re-export dispatch types
pub use operations::catalog::{self, CatalogIssue};
pub use operations::{Operation, Verb};
