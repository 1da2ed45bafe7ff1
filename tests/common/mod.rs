//! Shared helpers for driving the router without a TCP listener.
//!
//! Each test builds its own app (and with it an isolated in-memory store),
//! so nothing leaks between cases.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use recipebox::{app::build_app, state::AppState};

pub fn test_app() -> Router {
    build_app(AppState::in_memory())
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    app.clone().oneshot(request).await.expect("send request")
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response {
    send(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::DELETE, uri, token, None).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Register a user and return their access token.
pub async fn register(app: &Router, email: &str) -> String {
    let response = post_json(
        app,
        "/auth/register",
        None,
        json!({"email": email, "password": "testpass123"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["access_token"].as_str().expect("access token").to_string()
}

/// Create a recipe with the given overrides applied to a sample payload,
/// returning the detail representation.
pub async fn create_recipe(app: &Router, token: &str, overrides: Value) -> Value {
    let mut payload = json!({
        "title": "Sample recipe",
        "description": "Sample description",
        "time_minutes": 10,
        "price": "5.00",
        "link": "https://sample.com/recipe.pdf",
    });
    if let (Some(base), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    let response = post_json(app, "/recipes", Some(token), payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

pub const MULTIPART_BOUNDARY: &str = "recipebox-test-boundary";

/// Minimal valid PNG payload: the sniffer only inspects magic bytes.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\x0a0000000000";

/// Build a multipart/form-data body with a single field.
pub fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    field: &str,
    data: &[u8],
) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(multipart_body(field, data)))
        .expect("request");
    app.clone().oneshot(request).await.expect("send request")
}
