//! Cross-cutting guarantees of the request pipeline: one uniform error
//! body for every failure category, process-wide bearer handling, and
//! schema behavior on unexpected input.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use lodgely::app::{build_app, App};
use lodgely::config::AppConfig;

fn test_app() -> (App, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        upload_dir: dir.path().to_string_lossy().into_owned(),
        ..AppConfig::default()
    };
    (build_app(&config).unwrap(), dir)
}

async fn send(
    router: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn assert_uniform_shape(body: &Value, status: StatusCode) {
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 3, "error body must carry exactly three fields");
    assert_eq!(body["status"], status.as_u16());
    assert!(body["message"].is_string());
    assert!(body["component"].is_string());
}

#[tokio::test]
async fn test_every_failure_category_shares_one_body_shape() {
    let (app, _upload) = test_app();

    // 400: schema rejection
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/users/register",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_uniform_shape(&body, status);

    // 401: missing session
    let (status, body) = send(&app.router, Method::GET, "/users/login", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_uniform_shape(&body, status);

    // 404: absent resource
    let path = format!("/offers/{}", Uuid::new_v4());
    let (status, body) = send(&app.router, Method::GET, &path, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_uniform_shape(&body, status);

    // 409: explicit-status domain error
    let register = json!({ "name": "Keks", "email": "dup@example.com", "type": "pro", "password": "secret1" });
    send(&app.router, Method::POST, "/users/register", None, Some(register.clone())).await;
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/users/register",
        None,
        Some(register),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_uniform_shape(&body, status);
}

#[tokio::test]
async fn test_invalid_bearer_token_fails_even_on_public_routes() {
    let (app, _upload) = test_app();

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/offers",
        Some("garbage.token.here"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["component"], "TokenParser");
    assert_uniform_shape(&body, status);
}

#[tokio::test]
async fn test_absent_token_is_not_an_error_on_public_routes() {
    let (app, _upload) = test_app();

    let (status, body) = send(&app.router, Method::GET, "/offers", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_undeclared_body_fields_are_dropped_not_rejected() {
    let (app, _upload) = test_app();

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/users/register",
        None,
        Some(json!({
            "name": "Keks",
            "email": "extra@example.com",
            "type": "usual",
            "password": "secret1",
            "isAdmin": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("isAdmin").is_none());
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    use lodgely::auth::{JwtConfig, JwtManager};

    let (app, _upload) = test_app();

    // Signed with the right secret but already past its ttl
    let expired = JwtManager::new(JwtConfig {
        secret: AppConfig::default().jwt_secret,
        ttl: chrono::Duration::days(-1),
        ..JwtConfig::default()
    })
    .issue(Uuid::new_v4(), "ghost@example.com")
    .unwrap();

    let (status, body) = send(&app.router, Method::GET, "/offers", Some(&expired), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["component"], "TokenParser");
}

#[tokio::test]
async fn test_non_json_body_on_json_route_is_bad_request() {
    let (app, _upload) = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users/register")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("name=Keks"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
