//! Page-number pagination for Veracross collection endpoints.
//!
//! Veracross pages through collections with the `X-Page-Number` and
//! `X-Page-Size` request headers and wraps records in a `data` envelope.
//! [`fetch_all`] keeps requesting pages until one comes back empty.

use serde::Serialize;
use serde_json::Value;

use crate::client::VeracrossClient;
use crate::error::{Result, VeracrossError};
use crate::request::Request;
use crate::table::Table;

/// Why a listing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "status")]
pub enum Halt {
    /// An empty page (or a non-collection body) ended the listing.
    Exhausted,
    /// A page came back with this non-success status.
    Status(u16),
    /// The request's page limit was reached.
    PageLimit,
}

/// Records gathered by a listing, with how it ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched {
    /// All records, first page first.
    pub table: Table,
    /// Number of HTTP requests issued.
    pub requests: u32,
    /// Why the listing stopped.
    pub halt: Halt,
}

impl Fetched {
    pub(crate) fn single(table: Table) -> Self {
        Self {
            table,
            requests: 1,
            halt: Halt::Exhausted,
        }
    }

    /// True when every page was read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.halt == Halt::Exhausted
    }
}

/// A decoded `data` envelope.
pub(crate) enum Envelope {
    /// `data` held an array.
    Collection(Table),
    /// `data` held a single record, or the body had no envelope.
    Single(Table),
}

impl Envelope {
    pub(crate) fn into_table(self) -> Table {
        match self {
            Self::Collection(table) | Self::Single(table) => table,
        }
    }
}

/// Decode a response body into records.
///
/// An empty body is an empty collection. A JSON object with a `data` field is
/// unwrapped; any other object is taken as one record.
pub(crate) fn decode_envelope(body: &str) -> Result<Envelope> {
    if body.trim().is_empty() {
        return Ok(Envelope::Collection(Table::new()));
    }

    let value: Value = serde_json::from_str(body)?;
    let data = match value {
        Value::Object(mut object) => match object.remove("data") {
            Some(data) => data,
            None => Value::Object(object),
        },
        other => other,
    };

    match data {
        Value::Array(_) | Value::Null => Ok(Envelope::Collection(Table::from_value(data)?)),
        Value::Object(_) => Ok(Envelope::Single(Table::from_value(data)?)),
        other => Err(VeracrossError::UnexpectedResponse(format!(
            "data field held {other}"
        ))),
    }
}

/// Fetch every page of a collection.
///
/// Starts at the request's start page (default 1) and advances the page
/// number until an empty page arrives. A non-success status stops the loop
/// and the records read so far are returned as a success with
/// [`Halt::Status`]. There is no retry and, unless the request sets one, no
/// page limit.
///
/// # Errors
///
/// Returns an error on transport failures or undecodable bodies.
#[tracing::instrument(skip(client, request))]
pub async fn fetch_all(client: &VeracrossClient, path: &str, request: &Request) -> Result<Fetched> {
    let page_size = request.page_size.unwrap_or_else(|| client.page_size());
    let mut page = request.start_page.unwrap_or(1);
    let mut table = Table::new();
    let mut requests = 0u32;

    loop {
        if request.max_pages.is_some_and(|max| requests >= max) {
            tracing::warn!(requests, "page limit reached, stopping");
            return Ok(Fetched {
                table,
                requests,
                halt: Halt::PageLimit,
            });
        }

        let response = client.get_page(path, request, page, page_size).await?;
        requests += 1;

        let status = response.status();
        let body = response.text().await.map_err(VeracrossError::HttpError)?;

        if !status.is_success() {
            tracing::warn!(
                %status,
                %body,
                page,
                kept = table.len(),
                "page request failed, returning records read so far"
            );
            return Ok(Fetched {
                table,
                requests,
                halt: Halt::Status(status.as_u16()),
            });
        }

        match decode_envelope(&body)? {
            Envelope::Collection(rows) if rows.is_empty() => break,
            Envelope::Collection(rows) => {
                tracing::debug!(page, rows = rows.len(), "page received");
                table.extend(rows);
                page += 1;
            }
            Envelope::Single(rows) => {
                table.extend(rows);
                break;
            }
        }
    }

    Ok(Fetched {
        table,
        requests,
        halt: Halt::Exhausted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_collection() {
        let envelope = decode_envelope(r#"{"data": [{"id": 1}, {"id": 2}]}"#).unwrap();
        assert!(matches!(envelope, Envelope::Collection(ref t) if t.len() == 2));
    }

    #[test]
    fn test_decode_single_record() {
        let envelope = decode_envelope(r#"{"data": {"id": 1}}"#).unwrap();
        assert!(matches!(envelope, Envelope::Single(ref t) if t.len() == 1));
    }

    #[test]
    fn test_decode_empty_body() {
        let envelope = decode_envelope("  ").unwrap();
        assert!(matches!(envelope, Envelope::Collection(ref t) if t.is_empty()));
    }

    #[test]
    fn test_decode_bare_object_is_one_record() {
        let envelope = decode_envelope(r#"{"id": 5, "name": "x"}"#).unwrap();
        let table = envelope.into_table();
        assert_eq!(table.rows()[0]["id"], 5);
    }

    #[test]
    fn test_decode_scalar_data_rejected() {
        assert!(decode_envelope(r#"{"data": 3}"#).is_err());
        assert!(decode_envelope("not json").is_err());
    }

    #[test]
    fn test_fetched_completeness() {
        let fetched = Fetched::single(Table::new());
        assert!(fetched.is_complete());
        let partial = Fetched {
            halt: Halt::Status(500),
            ..fetched
        };
        assert!(!partial.is_complete());
    }
}
