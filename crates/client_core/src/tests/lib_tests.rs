use super::*;

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Path as RoutePath, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::error::ErrorCode;
use tokio::{net::TcpListener, sync::oneshot, time::timeout};

type Capture<T> = Arc<Mutex<Option<oneshot::Sender<T>>>>;

fn capture_channel<T>() -> (Capture<T>, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    (Arc::new(Mutex::new(Some(tx))), rx)
}

async fn send_captured<T>(capture: &Capture<T>, value: T) {
    if let Some(tx) = capture.lock().await.take() {
        let _ = tx.send(value);
    }
}

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn authed_client(server_url: &str) -> Arc<PanelClient> {
    PanelClient::new(server_url, Some("test-token".to_string())).expect("client")
}

#[derive(Clone)]
struct AuthState {
    auth_header: Capture<Option<String>>,
}

async fn login_handler() -> Json<Value> {
    Json(json!({ "token": "issued-jwt", "message": "Login successful" }))
}

async fn status_handler(State(state): State<AuthState>, headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    send_captured(&state.auth_header, auth).await;
    Json(json!({ "status": "running", "message": "Server is running", "pid": 1234 }))
}

#[tokio::test]
async fn login_stores_token_and_authorizes_later_requests() {
    let (auth_header, auth_rx) = capture_channel();
    let app = Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/status", get(status_handler))
        .with_state(AuthState { auth_header });
    let server_url = spawn_server(app).await;

    let client = PanelClient::new(&server_url, None).expect("client");
    let login = client.login("hunter2").await.expect("login");
    assert_eq!(login.token, "issued-jwt");
    assert_eq!(client.token().await.as_deref(), Some("issued-jwt"));

    let status = client.server_status().await.expect("status");
    assert!(status.status.is_running());
    assert_eq!(status.pid, Some(1234));

    let seen = auth_rx.await.expect("captured header");
    assert_eq!(seen.as_deref(), Some("Bearer issued-jwt"));
}

#[tokio::test]
async fn protected_call_without_token_fails_without_touching_the_network() {
    // Port 9 (discard) is never listened on; a network attempt would error
    // differently than MissingToken.
    let client = PanelClient::new("http://127.0.0.1:9", None).expect("client");
    let err = client.server_status().await.expect_err("must fail");
    assert!(matches!(err, ClientError::MissingToken));
}

#[tokio::test]
async fn backend_error_body_maps_to_api_error() {
    let app = Router::new().route(
        "/api/allowlist",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to read allowlist: boom" })),
            )
        }),
    );
    let server_url = spawn_server(app).await;
    let client = authed_client(&server_url);

    let err = client.allowlist().await.expect_err("must fail");
    match err {
        ClientError::Api { status, error } => {
            assert_eq!(status, 500);
            assert_eq!(error.code, ErrorCode::Internal);
            assert!(error.message.contains("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn failures_are_published_once_on_the_event_channel() {
    let app = Router::new().route(
        "/api/worlds",
        get(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "no world directory" })),
            )
        }),
    );
    let server_url = spawn_server(app).await;
    let client = authed_client(&server_url);
    let mut events = client.subscribe_events();

    let _ = client.worlds().await.expect_err("must fail");

    let event = timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timely event")
        .expect("open channel");
    match event {
        ClientEvent::Error(message) => assert!(message.contains("no world directory")),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[derive(Clone)]
struct BodyState {
    body: Capture<Value>,
}

async fn allowlist_add_handler(
    State(state): State<BodyState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    send_captured(&state.body, body).await;
    Json(json!({ "message": "Added to allowlist: Steve" }))
}

#[tokio::test]
async fn add_to_allowlist_sends_wire_body() {
    let (body, body_rx) = capture_channel();
    let app = Router::new()
        .route("/api/allowlist", post(allowlist_add_handler))
        .with_state(BodyState { body });
    let server_url = spawn_server(app).await;
    let client = authed_client(&server_url);

    let message = client.add_to_allowlist("Steve", false).await.expect("add");
    assert_eq!(message, "Added to allowlist: Steve");

    let body = body_rx.await.expect("captured body");
    assert_eq!(body["name"], "Steve");
    assert_eq!(body["ignoresPlayerLimit"], false);
}

#[derive(Clone)]
struct NameState {
    name: Capture<String>,
}

async fn allowlist_remove_handler(
    State(state): State<NameState>,
    RoutePath(name): RoutePath<String>,
) -> Json<Value> {
    send_captured(&state.name, name.clone()).await;
    Json(json!({ "message": format!("Removed from allowlist: {name}") }))
}

#[tokio::test]
async fn path_segments_are_percent_encoded() {
    let (name, name_rx) = capture_channel();
    let app = Router::new()
        .route("/api/allowlist/:name", delete(allowlist_remove_handler))
        .with_state(NameState { name });
    let server_url = spawn_server(app).await;
    let client = authed_client(&server_url);

    client
        .remove_from_allowlist("Steve Jr")
        .await
        .expect("remove");

    // A space that survived as a raw byte would never round-trip through
    // the router's path decoder.
    assert_eq!(name_rx.await.expect("captured name"), "Steve Jr");
}

#[tokio::test]
async fn version_routes_unwrap_the_success_envelope() {
    let app = Router::new()
        .route(
            "/api/server-versions",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": [{
                        "version": "1.21.3.01",
                        "download_url": "https://example.invalid/bedrock.zip",
                        "active": false,
                        "downloaded": true,
                        "path": "versions/1.21.3.01"
                    }]
                }))
            }),
        )
        .route(
            "/api/server-versions/:version/download",
            post(|| async { Json(json!({ "success": true, "message": "Download started" })) }),
        );
    let server_url = spawn_server(app).await;
    let client = authed_client(&server_url);

    let versions = client.server_versions().await.expect("versions");
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].version, "1.21.3.01");
    assert!(versions[0].downloaded);

    let message = client.download_version("1.21.3.01").await.expect("download");
    assert_eq!(message, "Download started");
}

#[derive(Clone)]
struct QueryState {
    query: Capture<HashMap<String, String>>,
}

async fn quick_commands_handler(
    State(state): State<QueryState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    send_captured(&state.query, query).await;
    Json(json!({ "commands": [], "count": 0 }))
}

#[tokio::test]
async fn quick_commands_pass_the_category_query() {
    let (query, query_rx) = capture_channel();
    let app = Router::new()
        .route("/api/commands", get(quick_commands_handler))
        .with_state(QueryState { query });
    let server_url = spawn_server(app).await;
    let client = authed_client(&server_url);

    let commands = client.quick_commands(Some("weather")).await.expect("list");
    assert!(commands.is_empty());

    let query = query_rx.await.expect("captured query");
    assert_eq!(query.get("category").map(String::as_str), Some("weather"));
}

async fn send_command_handler(
    State(state): State<BodyState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    send_captured(&state.body, body).await;
    Json(json!({ "message": "Command sent successfully", "command": "say hi" }))
}

#[tokio::test]
async fn send_command_stamps_a_client_timestamp() {
    let (body, body_rx) = capture_channel();
    let app = Router::new()
        .route("/api/interaction/command", post(send_command_handler))
        .with_state(BodyState { body });
    let server_url = spawn_server(app).await;
    let client = authed_client(&server_url);

    let response = client.send_command("say hi").await.expect("send");
    assert_eq!(response.command, "say hi");

    let body = body_rx.await.expect("captured body");
    assert_eq!(body["command"], "say hi");
    let timestamp = body["timestamp"].as_str().expect("timestamp string");
    // Backend format: "2006-01-02 15:04:05".
    assert_eq!(timestamp.len(), 19);
    assert_eq!(&timestamp[4..5], "-");
    assert_eq!(&timestamp[10..11], " ");
}

#[tokio::test]
async fn rejects_non_http_server_urls() {
    let err = PanelClient::new("ftp://example.invalid", None).expect_err("must fail");
    assert!(matches!(err, ClientError::UnsupportedScheme(_)));
}
