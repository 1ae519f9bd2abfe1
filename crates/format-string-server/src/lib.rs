//! HTTP routes for FormatString nodes.
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | POST | `/update_format_string_node` | `{nodeId, template_type, template}` | node configuration |
//! | POST | `/load_format_string_node` | `{file_path}` | saved state, or `{}` |
//! | GET | `/get_format_string_node_config/{node_id}` | | node configuration, or `{}` |
//! | POST | `/format_string` | `{template_type, template, save_path, values}` | render result |
//! | GET | `/object_info/{node_class}` | | node type descriptor |
//!
//! Missing fields in request bodies default to empty strings.

pub mod config;
pub mod observability;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use format_string::{
    FormatError, FormatRequest, FormatStringConfig, FormatStringNode, NodeConfigRegistry,
    find_node_class,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// State shared by every route.
#[derive(Debug, Clone)]
pub struct AppState {
    pub node: Arc<FormatStringNode>,
}

impl AppState {
    /// Creates the node together with a fresh, empty configuration registry.
    pub fn new(config: FormatStringConfig) -> Self {
        let registry = Arc::new(NodeConfigRegistry::new());
        Self {
            node: Arc::new(FormatStringNode::new(config, registry)),
        }
    }
}

/// Errors returned to HTTP clients as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Unknown node class: {0}")]
    UnknownNodeClass(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Format(FormatError::Render(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Format(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownNodeClass(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("Request failed with {}: {}", status, self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Accepts node ids sent either as JSON strings or numbers.
fn node_id_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateNodeBody {
    #[serde(rename = "nodeId", deserialize_with = "node_id_from_any")]
    pub node_id: String,
    pub template_type: String,
    pub template: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoadNodeBody {
    pub file_path: String,
}

#[derive(Debug, Serialize)]
pub struct FormatResponse {
    /// Output names, positionally matching `values` followed by the two fixed outputs.
    pub outputs: Vec<String>,
    pub values: Vec<String>,
    pub formatted_string: String,
    pub saved_file_path: String,
}

async fn update_format_string_node(
    State(state): State<AppState>,
    Json(body): Json<UpdateNodeBody>,
) -> Json<Value> {
    let config = state
        .node
        .update_widget(&body.node_id, &body.template_type, &body.template);
    Json(json!(config))
}

async fn load_format_string_node(
    State(state): State<AppState>,
    Json(body): Json<LoadNodeBody>,
) -> Json<Value> {
    debug!("Loading node state from '{}'", body.file_path);
    Json(state.node.load_node_state(&body.file_path).into_document())
}

async fn get_format_string_node_config(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Json<Value> {
    let config = state
        .node
        .get_node_config(&node_id)
        .map_or_else(|| json!({}), |config| json!(config));
    Json(config)
}

async fn render_format_string(
    State(state): State<AppState>,
    Json(request): Json<FormatRequest>,
) -> Result<Json<FormatResponse>, ApiError> {
    let output = state.node.format_string(&request)?;
    let outputs = output.schema.return_names();
    let saved_file_path = output.saved_file_path();
    Ok(Json(FormatResponse {
        outputs,
        values: output.values,
        formatted_string: output.formatted_string,
        saved_file_path,
    }))
}

async fn object_info(Path(node_class): Path<String>) -> Result<Json<Value>, ApiError> {
    let descriptor =
        find_node_class(&node_class).ok_or_else(|| ApiError::UnknownNodeClass(node_class))?;
    Ok(Json(json!(descriptor)))
}

/// Builds the router with every FormatString route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/update_format_string_node",
            post(update_format_string_node),
        )
        .route("/load_format_string_node", post(load_format_string_node))
        .route(
            "/get_format_string_node_config/{node_id}",
            get(get_format_string_node_config),
        )
        .route("/format_string", post(render_format_string))
        .route("/object_info/{node_class}", get(object_info))
        .with_state(state)
}
