//! Integration tests for the FormatString HTTP routes.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use format_string::FormatStringConfig;
use format_string_server::{AppState, router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

fn app(dir: &TempDir) -> (Router, AppState) {
    let config = FormatStringConfig::with_comfy_path(dir.path()).with_output_dir(dir.path());
    let state = AppState::new(config);
    (router(state.clone()), state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_update_node_returns_config() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app(&dir);

    let (status, body) = send(
        app,
        post_json(
            "/update_format_string_node",
            json!({"nodeId": "5", "template_type": "Jinja2", "template": "{{ who }} {when}"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inputs"]["template_type"], json!([["Simple", "Jinja2"]]));
    assert_eq!(body["inputs"]["who"], json!(["STRING", {"default": ""}]));
    assert_eq!(body["outputs"].as_array().unwrap().len(), 4);
    assert_eq!(body["outputs"][3]["name"], "saved_file_path");
    assert!(state.node.get_node_config("5").is_some());
}

#[tokio::test]
async fn test_update_node_accepts_numeric_id() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app(&dir);

    let (status, _) = send(
        app,
        post_json(
            "/update_format_string_node",
            json!({"nodeId": 12, "template": "{x}"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(state.node.get_node_config("12").is_some());
}

#[tokio::test]
async fn test_get_config_after_update() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);

    let (_, updated) = send(
        app.clone(),
        post_json(
            "/update_format_string_node",
            json!({"nodeId": "9", "template_type": "Simple", "template": "{a}"}),
        ),
    )
    .await;
    let (status, fetched) = send(app, get("/get_format_string_node_config/9")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_get_config_unknown_node_is_empty() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);

    let (status, body) = send(app, get("/get_format_string_node_config/404")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_format_string_saves_and_load_restores() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);

    let (status, rendered) = send(
        app.clone(),
        post_json(
            "/format_string",
            json!({
                "template_type": "Simple",
                "template": "Hello {name}",
                "save_path": "states/hello.json",
                "values": {"name": "Ann"}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rendered["formatted_string"], "Hello Ann");
    assert_eq!(rendered["values"], json!(["Ann"]));
    assert_eq!(
        rendered["outputs"],
        json!(["name", "formatted_string", "saved_file_path"])
    );

    let saved_path = rendered["saved_file_path"].as_str().unwrap().to_string();
    assert!(saved_path.ends_with("hello.json"));

    let (status, loaded) = send(
        app,
        post_json("/load_format_string_node", json!({"file_path": saved_path})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        loaded,
        json!({
            "inputs": {"name": "Ann"},
            "template": "Hello {name}",
            "template_type": "Simple"
        })
    );
}

#[tokio::test]
async fn test_format_string_missing_key_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);

    let (status, body) = send(
        app,
        post_json(
            "/format_string",
            json!({"template_type": "Simple", "template": "Hi {who}"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("who"));
}

#[tokio::test]
async fn test_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);
    let path = dir.path().join("nothing.json");

    let (status, body) = send(
        app,
        post_json(
            "/load_format_string_node",
            json!({"file_path": path.display().to_string()}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_object_info() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app(&dir);

    let (status, body) = send(app.clone(), get("/object_info/FormatString")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Format String");
    assert_eq!(body["category"], "dv/string_operations");
    assert_eq!(body["output"], json!(["STRING", "STRING"]));

    let (status, _) = send(app, get("/object_info/Nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
