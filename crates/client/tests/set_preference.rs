//! Integration test: run an in-process query service on an ephemeral port and
//! submit preferences against it.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracedash_client::{ApiClient, ApiResponse, ClientConfig};

type Received = Arc<Mutex<Vec<Value>>>;

async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}/api/v1")
}

fn client(base_url: String) -> ApiClient {
    ApiClient::new(ClientConfig::with_base_url(base_url)).expect("client builds")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Preferences {
    is_anonymous: bool,
    has_opted_updates: bool,
}

#[tokio::test]
async fn success_wraps_body_and_posts_props_once() {
    let received: Received = Arc::default();
    let app = Router::new()
        .route(
            "/api/v1/userPreferences",
            post(
                |State(received): State<Received>, Json(body): Json<Value>| async move {
                    received.lock().expect("lock").push(body.clone());
                    Json(json!({"status": "success", "data": body}))
                },
            ),
        )
        .with_state(received.clone());
    let api = client(spawn_server(app).await);

    let props = Preferences {
        is_anonymous: false,
        has_opted_updates: true,
    };
    let result = api.set_preference(&props).await;

    let ApiResponse::Success(success) = &result else {
        panic!("expected success, got {result:?}");
    };
    assert_eq!(success.status_code, 200);
    assert_eq!(success.error, None);
    assert_eq!(success.message.as_deref(), Some("success"));
    assert_eq!(
        success.payload["data"],
        json!({"isAnonymous": false, "hasOptedUpdates": true})
    );

    let bodies = received.lock().expect("lock").clone();
    assert_eq!(bodies, [json!({"isAnonymous": false, "hasOptedUpdates": true})]);

    let envelope = serde_json::to_value(&result).expect("serializes");
    assert_eq!(envelope["statusCode"], json!(200));
    assert_eq!(envelope["error"], Value::Null);
}

#[tokio::test]
async fn client_errors_are_normalized() {
    let app = Router::new().route(
        "/api/v1/userPreferences",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "errors": [{"msg": "isAnonymous must be a boolean"}],
                    "data": null
                })),
            )
        }),
    );
    let api = client(spawn_server(app).await);

    let result = api.set_preference(&json!({"isAnonymous": "maybe"})).await;
    let ApiResponse::Error(err) = result else {
        panic!("expected error");
    };
    assert_eq!(err.status_code, 400);
    assert_eq!(err.error, "isAnonymous must be a boolean");
    assert_eq!(err.message.as_deref(), Some("error"));
    assert_eq!(err.body.as_deref(), Some("null"));
    assert_eq!(err.payload, None);
}

#[tokio::test]
async fn missing_route_and_server_errors() {
    let app = Router::new().route(
        "/api/v1/userPreferences",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn_server(app).await;

    let result = client(base.clone()).set_preference(&json!({})).await;
    assert_eq!(result.status_code(), 500);
    let ApiResponse::Error(err) = result else {
        panic!("expected error");
    };
    assert_eq!(err.error, "Something went wrong");

    // Unknown path: axum answers 404 with an empty body.
    let result = client(format!("{base}/nope")).set_preference(&json!({})).await;
    let ApiResponse::Error(err) = result else {
        panic!("expected error");
    };
    assert_eq!(err.status_code, 404);
    assert_eq!(err.error, "Something went wrong");
}

#[tokio::test]
async fn success_with_non_json_body_keeps_the_text() {
    let app = Router::new().route("/api/v1/userPreferences", post(|| async { "ok" }));
    let api = client(spawn_server(app).await);

    let result = api.set_preference(&json!({})).await;
    let ApiResponse::Success(success) = result else {
        panic!("expected success");
    };
    assert_eq!(success.status_code, 200);
    assert_eq!(success.message, None);
    assert_eq!(success.payload, Value::String("ok".to_string()));
}

#[tokio::test]
async fn any_json_success_body_is_a_success() {
    let app = Router::new()
        .route(
            "/api/v1/userPreferences",
            post(|| async { Json(json!({"status": 200, "data": {}})) }),
        )
        .route(
            "/api/v1/created/userPreferences",
            post(|| async { (StatusCode::CREATED, Json(json!(["a", "b"]))) }),
        );
    let base = spawn_server(app).await;

    let result = client(base.clone()).set_preference(&json!({})).await;
    assert!(result.is_success(), "{result:?}");
    let ApiResponse::Success(success) = result else {
        panic!("expected success");
    };
    // A non-string status is no message.
    assert_eq!(success.message, None);
    assert_eq!(success.payload, json!({"status": 200, "data": {}}));

    let result = client(format!("{base}/created")).set_preference(&json!({})).await;
    let ApiResponse::Success(success) = result else {
        panic!("expected success for 201");
    };
    assert_eq!(success.payload, json!(["a", "b"]));
}

#[tokio::test]
async fn connection_refused_becomes_error_response() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let api = client(format!("http://{addr}/api/v1"));
    let result = api.set_preference(&json!({"isAnonymous": true})).await;
    let ApiResponse::Error(err) = result else {
        panic!("expected error");
    };
    assert_eq!(err.status_code, 500);
    assert_eq!(err.error, "Something went wrong");
    assert_eq!(err.message, None);
    assert_eq!(err.payload, None);
}
