//! Operation dispatch.
//!
//! Every Veracross resource/verb pair is one [`Operation`] row in the
//! [`catalog`]. A single generic routine checks the operation's scope,
//! renders its path, and sends the request: collections go through
//! [`fetch_all`], everything else is one call.

pub mod catalog;

use std::fmt;

use reqwest::Method;
use serde::Serialize;

use crate::client::VeracrossClient;
use crate::error::{Result, VeracrossError};
use crate::pagination::{decode_envelope, fetch_all, Fetched};
use crate::request::Request;
use crate::table::Table;

/// HTTP verb of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Patch => Method::PATCH,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Method::from(*self).as_str())
    }
}

/// One row of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// Unique name, e.g. `academics.classes.list`.
    pub name: &'static str,
    pub verb: Verb,
    /// Path relative to the API base, with `{param}` placeholders.
    pub path: &'static str,
    /// Scope that must be declared before the call is attempted.
    pub scope: &'static str,
    /// Whether the response is paged with the page headers. Only honoured
    /// for [`Verb::Get`].
    pub paginated: bool,
}

impl Operation {
    pub const fn new(
        name: &'static str,
        verb: Verb,
        path: &'static str,
        scope: &'static str,
        paginated: bool,
    ) -> Self {
        Self {
            name,
            verb,
            path,
            scope,
            paginated,
        }
    }

    /// Paginated GET over a collection.
    pub const fn list(name: &'static str, path: &'static str, scope: &'static str) -> Self {
        Self::new(name, Verb::Get, path, scope, true)
    }

    /// Single GET.
    pub const fn read(name: &'static str, path: &'static str, scope: &'static str) -> Self {
        Self::new(name, Verb::Get, path, scope, false)
    }

    pub const fn create(name: &'static str, path: &'static str, scope: &'static str) -> Self {
        Self::new(name, Verb::Post, path, scope, false)
    }

    pub const fn update(name: &'static str, path: &'static str, scope: &'static str) -> Self {
        Self::new(name, Verb::Patch, path, scope, false)
    }

    pub const fn delete(name: &'static str, path: &'static str, scope: &'static str) -> Self {
        Self::new(name, Verb::Delete, path, scope, false)
    }

    /// Names of the `{placeholder}` segments in the path.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.path;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    names.push(&after[..close]);
                    rest = &after[close + 1..];
                }
                None => break,
            }
        }
        names
    }

    /// Fill the path placeholders from the request's path parameters.
    ///
    /// # Errors
    ///
    /// Returns [`VeracrossError::MissingPathParam`] if a placeholder has no
    /// value, and [`VeracrossError::InvalidPathParam`] if the value is empty,
    /// `.` or `..` (URL joining would resolve those to another resource).
    pub fn render_path(&self, request: &Request) -> Result<String> {
        let mut path = String::with_capacity(self.path.len());
        let mut rest = self.path;

        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                break;
            };
            let param = &after[..close];
            let value = request
                .path_value(param)
                .ok_or_else(|| VeracrossError::MissingPathParam {
                    operation: self.name.to_string(),
                    param: param.to_string(),
                })?;
            if matches!(value, "" | "." | "..") {
                return Err(VeracrossError::InvalidPathParam {
                    operation: self.name.to_string(),
                    param: param.to_string(),
                    value: value.to_string(),
                });
            }
            path.push_str(&rest[..open]);
            path.push_str(&urlencoding::encode(value));
            rest = &after[close + 1..];
        }

        path.push_str(rest);
        Ok(path)
    }
}

impl VeracrossClient {
    /// Run a catalog operation, logging failures and returning an empty
    /// table instead of an error.
    ///
    /// An empty result can mean "no records", a missing scope, or a failed
    /// request; use [`try_call`](Self::try_call) to tell them apart.
    pub async fn call(&self, name: &str, request: &Request) -> Table {
        match self.try_call(name, request).await {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(
                    operation = name,
                    error = %err,
                    "call failed, returning empty table"
                );
                Table::new()
            }
        }
    }

    /// Run a catalog operation.
    ///
    /// A listing that hits a non-success page still returns the records read
    /// so far; use [`fetch`](Self::fetch) to see how it ended.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation is unknown, its scope was not
    /// declared (no request is sent), a path parameter is missing, or the
    /// request fails.
    pub async fn try_call(&self, name: &str, request: &Request) -> Result<Table> {
        Ok(self.fetch(name, request).await?.table)
    }

    /// Run a catalog operation and report how the listing ended.
    ///
    /// # Errors
    ///
    /// Same as [`try_call`](Self::try_call).
    pub async fn fetch(&self, name: &str, request: &Request) -> Result<Fetched> {
        let operation = catalog::find(name)
            .ok_or_else(|| VeracrossError::UnknownOperation(name.to_string()))?;
        self.execute(operation, request).await
    }

    /// Run any operation, including ones defined outside the catalog.
    ///
    /// # Errors
    ///
    /// Same as [`try_call`](Self::try_call), minus the unknown-operation case.
    #[tracing::instrument(skip(self, operation, request), fields(operation = operation.name))]
    pub async fn execute(&self, operation: &Operation, request: &Request) -> Result<Fetched> {
        if !self.has_scope(operation.scope) {
            tracing::warn!(scope = operation.scope, "scope not declared, skipping request");
            return Err(VeracrossError::MissingScope {
                operation: operation.name.to_string(),
                scope: operation.scope,
            });
        }

        let path = operation.render_path(request)?;

        // Only GET listings are paged; a paged write goes out once with its body.
        if operation.paginated && operation.verb == Verb::Get {
            return fetch_all(self, &path, request).await;
        }

        let response = self.send(operation.verb.into(), &path, request).await?;
        let body = response.text().await.map_err(VeracrossError::HttpError)?;
        Ok(Fetched::single(decode_envelope(&body)?.into_table()))
    }
}
