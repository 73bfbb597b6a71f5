//! OAuth token endpoint handler.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;

/// Form body of a client-credentials token request.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// POST /{route}/oauth/token
pub async fn issue_token(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(_route): Path<String>,
    Form(form): Form<TokenForm>,
) -> impl IntoResponse {
    let state = state.read().await;

    if form.grant_type != "client_credentials" {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "unsupported_grant_type",
                "error_description": format!("Grant type '{}' is not supported", form.grant_type)
            })),
        );
    }

    if !state.accepts_client(&form.client_id, &form.client_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "Client authentication failed"
            })),
        );
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "access_token": state.issued_token,
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": form.scope.unwrap_or_default(),
        })),
    )
}
