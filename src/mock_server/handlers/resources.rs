//! API resource handlers.
//!
//! One wildcard route serves every Veracross path. A path naming a stored
//! collection is a listing; `<collection>/<id>` addresses one record.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;
use crate::{PAGE_NUMBER_HEADER, PAGE_SIZE_HEADER};

const DEFAULT_PAGE_SIZE: usize = 100;

fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "errors": [{"message": format!("No resource found at {path}")}]
        })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Invalid or missing access token"})),
    )
        .into_response()
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<usize> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

/// Split `collection/id` into its parts.
fn split_item(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('/')
}

/// Record the request and check its bearer token.
async fn admit(state: &Arc<RwLock<MockState>>, headers: &HeaderMap) -> bool {
    let mut state = state.write().await;
    state.api_requests += 1;
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    state.authorizes(authorization)
}

/// GET /{route}/v3/{*path}
pub async fn read_resource(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_route, path)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !admit(&state, &headers).await {
        return unauthorized();
    }

    let path = path.trim_matches('/');
    let state = state.read().await;

    let page = header_number(&headers, PAGE_NUMBER_HEADER).unwrap_or(1);
    let size = header_number(&headers, PAGE_SIZE_HEADER).unwrap_or(DEFAULT_PAGE_SIZE);

    if let Some(records) = state.page(path, page, size) {
        return Json(json!({ "data": records })).into_response();
    }

    match split_item(path).and_then(|(collection, id)| state.find(collection, id)) {
        Some(record) => Json(json!({ "data": record })).into_response(),
        None => not_found(path),
    }
}

/// POST /{route}/v3/{*path}
pub async fn create_resource(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_route, path)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !admit(&state, &headers).await {
        return unauthorized();
    }

    let Value::Object(fields) = body else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "Body must be a JSON object"})),
        )
            .into_response();
    };

    let mut state = state.write().await;
    let created = state.insert(path.trim_matches('/'), fields);
    (StatusCode::CREATED, Json(json!({ "data": created }))).into_response()
}

/// PATCH /{route}/v3/{*path}
pub async fn update_resource(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_route, path)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !admit(&state, &headers).await {
        return unauthorized();
    }

    let path = path.trim_matches('/');
    let fields = match body {
        Value::Object(fields) => fields,
        _ => Default::default(),
    };

    let mut state = state.write().await;
    match split_item(path).and_then(|(collection, id)| state.update(collection, id, fields)) {
        Some(record) => Json(json!({ "data": record })).into_response(),
        None => not_found(path),
    }
}

/// DELETE /{route}/v3/{*path}
pub async fn delete_resource(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((_route, path)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !admit(&state, &headers).await {
        return unauthorized();
    }

    let path = path.trim_matches('/');
    let mut state = state.write().await;
    let removed = split_item(path).is_some_and(|(collection, id)| state.remove(collection, id));

    if removed {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(path)
    }
}
