//! Client-credentials token exchange.
//!
//! A token is requested exactly once, when the client is built. It is never
//! refreshed; `expires_in` is kept for the caller's information only.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::config::Config;
use crate::error::{Result, VeracrossError};

const GRANT_TYPE: &str = "client_credentials";

/// A bearer token issued by the Veracross token endpoint.
#[derive(Clone)]
pub struct Credential {
    access_token: String,
    token_type: String,
    expires_in: Option<u64>,
    granted_scope: Option<String>,
    obtained_at: DateTime<Utc>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// Wrap an already-issued bearer token.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_in: None,
            granted_scope: None,
            obtained_at: Utc::now(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Lifetime in seconds reported by the server, if any.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    /// Space-separated scopes the server says it granted.
    pub fn granted_scope(&self) -> Option<&str> {
        self.granted_scope.as_deref()
    }

    pub fn obtained_at(&self) -> DateTime<Utc> {
        self.obtained_at
    }
}

#[skip_serializing_none]
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    scope: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchange the configured client credentials for a bearer token.
///
/// Returns `Ok(None)` when the server answers without an `access_token`; the
/// server's error description is logged. Transport failures are returned as
/// errors.
#[tracing::instrument(skip(http, config), fields(route = %config.route))]
pub(crate) async fn acquire(http: &Client, config: &Config) -> Result<Option<Credential>> {
    let url = config.token_url()?;
    let scope = (!config.scopes.is_empty()).then(|| config.scopes.to_request_string());
    let form = TokenRequest {
        grant_type: GRANT_TYPE,
        client_id: &config.client_id,
        client_secret: &config.client_secret,
        scope,
    };

    let response = http
        .post(url)
        .form(&form)
        .send()
        .await
        .map_err(VeracrossError::HttpError)?;
    let status = response.status();
    let body = response.text().await.map_err(VeracrossError::HttpError)?;

    let parsed: TokenResponse = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(e) if status.is_success() => return Err(VeracrossError::ParseError(e)),
        Err(_) => TokenResponse::default(),
    };

    match parsed.access_token {
        Some(access_token) => {
            tracing::debug!(expires_in = ?parsed.expires_in, "access token acquired");
            Ok(Some(Credential {
                access_token,
                token_type: parsed.token_type.unwrap_or_else(|| "Bearer".to_string()),
                expires_in: parsed.expires_in,
                granted_scope: parsed.scope,
                obtained_at: Utc::now(),
            }))
        }
        None => {
            let reason = parsed
                .error_description
                .or(parsed.error)
                .unwrap_or_else(|| format!("HTTP {status}"));
            tracing::error!(%status, %reason, "token request rejected");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_form_skips_empty_scope() {
        let form = TokenRequest {
            grant_type: GRANT_TYPE,
            client_id: "id",
            client_secret: "secret",
            scope: None,
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["grant_type"], "client_credentials");
        assert!(value.get("scope").is_none());
    }

    #[test]
    fn test_error_response_parses() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{"error": "invalid_client", "error_description": "Client authentication failed"}"#,
        )
        .unwrap();
        assert!(parsed.access_token.is_none());
        assert_eq!(
            parsed.error_description.as_deref(),
            Some("Client authentication failed")
        );
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let credential = Credential::bearer("very-secret-token");
        let debug = format!("{credential:?}");
        assert!(debug.contains("Bearer"));
        assert!(!debug.contains("very-secret-token"));
    }
}
