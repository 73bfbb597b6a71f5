//! Client configuration.
//!
//! Every Veracross URL is derived from the school route: the API lives at
//! `https://api.veracross.com/<route>/v3/` and tokens are issued by
//! `https://accounts.veracross.com/<route>/oauth/token`.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{Result, VeracrossError};
use crate::scope::Scopes;

pub(crate) const DEFAULT_API_HOST: &str = "https://api.veracross.com";
pub(crate) const DEFAULT_AUTH_HOST: &str = "https://accounts.veracross.com";
const API_VERSION: &str = "v3";

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings needed to build a [`VeracrossClient`](crate::VeracrossClient).
///
/// # Example
///
/// ```
/// use veracross::{Config, Scopes};
///
/// let config = Config::new(
///     "demo_school",
///     "client-id",
///     "client-secret",
///     Scopes::parse("students:list students:read"),
/// )
/// .with_page_size(500);
///
/// assert_eq!(
///     config.api_base_url().unwrap().as_str(),
///     "https://api.veracross.com/demo_school/v3/"
/// );
/// ```
#[derive(Clone)]
pub struct Config {
    /// School route, the path segment identifying the school.
    pub route: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Scopes requested from the token endpoint and checked locally.
    pub scopes: Scopes,
    /// API host override (scheme + host, no route).
    pub api_host: Option<String>,
    /// Token host override (scheme + host, no route).
    pub auth_host: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Page size used when a request does not set one.
    pub page_size: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("route", &self.route)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("api_host", &self.api_host)
            .field("auth_host", &self.auth_host)
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn new(
        route: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scopes: Scopes,
    ) -> Self {
        Self {
            route: route.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes,
            api_host: None,
            auth_host: None,
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `VERACROSS_SCHOOL_ROUTE`, `VERACROSS_CLIENT_ID`,
    /// `VERACROSS_CLIENT_SECRET` and `VERACROSS_SCOPES` (all required), plus
    /// the optional `VERACROSS_API_HOST` and `VERACROSS_AUTH_HOST` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is not set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            required_var("VERACROSS_SCHOOL_ROUTE")?,
            required_var("VERACROSS_CLIENT_ID")?,
            required_var("VERACROSS_CLIENT_SECRET")?,
            Scopes::parse(&required_var("VERACROSS_SCOPES")?),
        );
        config.api_host = env::var("VERACROSS_API_HOST").ok();
        config.auth_host = env::var("VERACROSS_AUTH_HOST").ok();
        Ok(config)
    }

    pub fn with_api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into());
        self
    }

    pub fn with_auth_host(mut self, host: impl Into<String>) -> Self {
        self.auth_host = Some(host.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default page size. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Base URL for API requests, always ending in `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the route is empty or the host is not a valid URL.
    pub fn api_base_url(&self) -> Result<Url> {
        let host = self.api_host.as_deref().unwrap_or(DEFAULT_API_HOST);
        let route = self.checked_route()?;
        Ok(Url::parse(&format!(
            "{}/{route}/{API_VERSION}/",
            host.trim_end_matches('/')
        ))?)
    }

    /// The OAuth token endpoint for this school.
    ///
    /// # Errors
    ///
    /// Returns an error if the route is empty or the host is not a valid URL.
    pub fn token_url(&self) -> Result<Url> {
        let host = self.auth_host.as_deref().unwrap_or(DEFAULT_AUTH_HOST);
        let route = self.checked_route()?;
        Ok(Url::parse(&format!(
            "{}/{route}/oauth/token",
            host.trim_end_matches('/')
        ))?)
    }

    fn checked_route(&self) -> Result<String> {
        let route = self.route.trim_matches('/');
        if route.is_empty() {
            return Err(VeracrossError::ConfigMissing(
                "school route must not be empty".to_string(),
            ));
        }
        Ok(urlencoding::encode(route).into_owned())
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| {
        VeracrossError::ConfigMissing(format!("{name} environment variable not set"))
    })
}
