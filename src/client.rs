//! Veracross API client.
//!
//! Low-level HTTP client that handles authentication, header assembly and raw
//! requests. Operations are dispatched through [`crate::operations`].

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use url::Url;

use crate::auth::{self, Credential};
use crate::config::{Config, DEFAULT_PAGE_SIZE};
use crate::error::{Result, VeracrossError};
use crate::request::Request;
use crate::scope::Scopes;

/// Header selecting the API revision.
pub const REVISION_HEADER: &str = "X-API-Revision";
/// Header asking the API to expand value-list fields.
pub const VALUE_LISTS_HEADER: &str = "X-API-Value-Lists";
/// Header carrying the 1-indexed page number.
pub const PAGE_NUMBER_HEADER: &str = "X-Page-Number";
/// Header carrying the page size.
pub const PAGE_SIZE_HEADER: &str = "X-Page-Size";

const USER_AGENT: &str = concat!("veracross/", env!("CARGO_PKG_VERSION"));

/// Veracross API client.
///
/// Holds the bearer token obtained at construction, the declared scopes and
/// the per-school base URL. The token is never refreshed.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use veracross::{Config, Scopes, VeracrossClient};
///
/// # async fn example() -> veracross::Result<()> {
/// // Create from environment variables
/// let client = VeracrossClient::from_env().await?;
///
/// // Or configure manually
/// let config = Config::new("school_route", "id", "secret", Scopes::parse("students:list"));
/// let client = VeracrossClient::connect(&config).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VeracrossClient {
    http: Client,
    base_url: Arc<Url>,
    credential: Option<Arc<Credential>>,
    scopes: Arc<Scopes>,
    page_size: u32,
}

impl std::fmt::Debug for VeracrossClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VeracrossClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.credential.is_some())
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl VeracrossClient {
    /// Create a client from environment variables.
    ///
    /// See [`Config::from_env`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the token
    /// request cannot be sent.
    pub async fn from_env() -> Result<Self> {
        Self::connect(&Config::from_env()?).await
    }

    /// Build a client and exchange the client credentials for a token.
    ///
    /// A token response without an `access_token` does not fail: the error
    /// description is logged and the client is returned unauthenticated, so
    /// later calls come back empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the token endpoint
    /// cannot be reached, or it answers success with a non-JSON body.
    pub async fn connect(config: &Config) -> Result<Self> {
        let http = Self::http_client(config)?;
        let credential = auth::acquire(&http, config).await?;
        Self::assemble(http, config, credential)
    }

    /// Build a client around an existing credential, skipping the token
    /// exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_credential(config: &Config, credential: Option<Credential>) -> Result<Self> {
        let http = Self::http_client(config)?;
        Self::assemble(http, config, credential)
    }

    fn http_client(config: &Config) -> Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .build()
            .map_err(VeracrossError::HttpError)
    }

    fn assemble(http: Client, config: &Config, credential: Option<Credential>) -> Result<Self> {
        Ok(Self {
            http,
            base_url: Arc::new(config.api_base_url()?),
            credential: credential.map(Arc::new),
            scopes: Arc::new(config.scopes.clone()),
            page_size: if config.page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                config.page_size
            },
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token obtained at construction, if the exchange succeeded.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    /// Whether the caller declared `scope`.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Default page size for listings.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Start a request with the conventional headers applied.
    fn builder(&self, method: Method, path: &str, request: &Request) -> Result<RequestBuilder> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;

        let mut builder = self.http.request(method, url).query(&request.query);
        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(credential.access_token());
        }
        if let Some(revision) = &request.revision {
            builder = builder.header(REVISION_HEADER, revision.as_str());
        }
        if request.includes_value_lists() {
            builder = builder.header(VALUE_LISTS_HEADER, "include");
        }
        Ok(builder)
    }

    /// Make a GET request for one page of a collection.
    ///
    /// The response is returned unchecked; the caller decides what a
    /// non-success status means.
    #[tracing::instrument(skip(self, request))]
    pub async fn get_page(
        &self,
        path: &str,
        request: &Request,
        page: u32,
        page_size: u32,
    ) -> Result<Response> {
        self.builder(Method::GET, path, request)?
            .header(PAGE_NUMBER_HEADER, page)
            .header(PAGE_SIZE_HEADER, page_size)
            .send()
            .await
            .map_err(VeracrossError::HttpError)
    }

    /// Send a request with the conventional headers and the request's JSON
    /// body, if any.
    ///
    /// # Errors
    ///
    /// Returns [`VeracrossError::RateLimited`] on 429, [`VeracrossError::ApiError`]
    /// on any other non-success status, and transport errors as
    /// [`VeracrossError::HttpError`].
    #[tracing::instrument(skip(self, request))]
    pub async fn send(&self, method: Method, path: &str, request: &Request) -> Result<Response> {
        let mut builder = self.builder(method, path, request)?;
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(VeracrossError::HttpError)?;

        Self::check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = ["retry-after", "x-rate-limit-reset"]
                .iter()
                .find_map(|name| response.headers().get(*name))
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(VeracrossError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let message = Self::extract_error_message(response, status).await;
        Err(VeracrossError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            for key in ["message", "error_description", "error"] {
                if let Some(msg) = json.get(key).and_then(|m| m.as_str()) {
                    return msg.to_string();
                }
            }
            if let Some(msg) = json
                .pointer("/errors/0/message")
                .and_then(|m| m.as_str())
            {
                return msg.to_string();
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new("demo", "id", "secret", Scopes::parse("students:list"))
    }

    #[test]
    fn test_client_debug() {
        let client =
            VeracrossClient::with_credential(&config(), Some(Credential::bearer("test-token")))
                .unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("VeracrossClient"));
        assert!(debug.contains("base_url"));
        // Token should not be in debug output
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn test_base_url_from_route() {
        let client = VeracrossClient::with_credential(&config(), None).unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://api.veracross.com/demo/v3/"
        );
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_scopes_carried() {
        let client = VeracrossClient::with_credential(&config(), None).unwrap();
        assert!(client.has_scope("students:list"));
        assert!(!client.has_scope("students:read"));
    }

    #[test]
    fn test_builder_headers() {
        let client =
            VeracrossClient::with_credential(&config(), Some(Credential::bearer("tok"))).unwrap();
        let request = Request::new().revision("2").query("grade_level", 9);
        let built = client
            .builder(Method::GET, "/students", &request)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            built.url().as_str(),
            "https://api.veracross.com/demo/v3/students?grade_level=9"
        );
        let headers = built.headers();
        assert_eq!(headers["authorization"], "Bearer tok");
        assert_eq!(headers[REVISION_HEADER], "2");
        assert_eq!(headers[VALUE_LISTS_HEADER], "include");
    }

    #[test]
    fn test_builder_without_token_or_value_lists() {
        let client = VeracrossClient::with_credential(&config(), None).unwrap();
        let request = Request::new().value_lists(false);
        let built = client
            .builder(Method::GET, "students", &request)
            .unwrap()
            .build()
            .unwrap();

        assert!(built.headers().get("authorization").is_none());
        assert!(built.headers().get(VALUE_LISTS_HEADER).is_none());
        assert_eq!(built.url().query(), None);
    }
}
