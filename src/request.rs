//! Per-call arguments.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Arguments for one operation call.
///
/// Path parameters fill `{placeholder}` segments of the operation's path,
/// query parameters are appended to the URL, and the body is sent as JSON on
/// create/update calls. The remaining fields become request headers.
///
/// ```
/// use veracross::Request;
///
/// let request = Request::new()
///     .id(1234)
///     .query("school_year", 2024)
///     .revision("1")
///     .page_size(200);
/// assert_eq!(request.path_value("id"), Some("1234"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub(crate) path_params: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
    pub(crate) revision: Option<String>,
    pub(crate) page_size: Option<u32>,
    pub(crate) start_page: Option<u32>,
    pub(crate) max_pages: Option<u32>,
    pub(crate) value_lists: Option<bool>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the `{id}` path parameter.
    pub fn id(self, id: impl ToString) -> Self {
        self.param("id", id)
    }

    /// Set a path parameter. A later value for the same name wins.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let name = name.into();
        self.path_params.retain(|(k, _)| *k != name);
        self.path_params.push((name, value.to_string()));
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    /// JSON body for create and update calls.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        Ok(self.body(serde_json::to_value(body)?))
    }

    /// Value for the `X-API-Revision` header.
    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// Records per page, overriding the client default.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// First page number to request (1-indexed).
    pub fn start_page(mut self, page: u32) -> Self {
        self.start_page = Some(page.max(1));
        self
    }

    /// Stop a listing after this many requests.
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Whether to send `X-API-Value-Lists: include`. Defaults to true.
    pub fn value_lists(mut self, include: bool) -> Self {
        self.value_lists = Some(include);
        self
    }

    /// Value of a path parameter.
    pub fn path_value(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn json_body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) fn includes_value_lists(&self) -> bool {
        self.value_lists.unwrap_or(true)
    }
}
