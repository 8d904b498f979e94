use super::*;

use axum::{
    extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};
use tokio::{net::TcpListener, sync::broadcast, time::timeout};

use crate::{ClientEvent, PanelClient};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn entry(message: &str) -> ServerLogEntry {
    ServerLogEntry {
        timestamp: "2026-08-06 12:00:00".to_string(),
        level: "INFO".to_string(),
        message: message.to_string(),
    }
}

#[tokio::test]
async fn retained_tail_is_capped_at_the_buffer_limit() {
    let client = PanelClient::new("http://127.0.0.1:9", Some("token".into())).expect("client");

    for i in 0..(LOG_BUFFER_CAP + 5) {
        client.push_log(entry(&format!("line {i}"))).await;
    }

    let logs = client.recent_logs().await;
    assert_eq!(logs.len(), LOG_BUFFER_CAP);
    assert_eq!(logs[0].message, "line 5");
    assert_eq!(logs[LOG_BUFFER_CAP - 1].message, format!("line {}", LOG_BUFFER_CAP + 4));
}

#[tokio::test]
async fn stream_url_rewrites_the_scheme_and_carries_the_token() {
    let client = PanelClient::new("http://panel.local:8080", Some("abc.def.ghi".into()))
        .expect("client");
    let url = client.log_stream_url().await.expect("url");
    assert_eq!(
        url,
        "ws://panel.local:8080/api/websocket/logs?token=abc.def.ghi"
    );

    let secure = PanelClient::new("https://panel.local", Some("abc".into())).expect("client");
    let url = secure.log_stream_url().await.expect("url");
    assert!(url.starts_with("wss://"));
}

#[tokio::test]
async fn stream_url_requires_a_token() {
    let client = PanelClient::new("http://panel.local", None).expect("client");
    let err = client.log_stream_url().await.expect_err("must fail");
    assert!(matches!(err, ClientError::MissingToken));
}

async fn ws_handler(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(serve_two_entries)
}

async fn serve_two_entries(mut socket: WebSocket) {
    for i in 0..2 {
        let frame = serde_json::json!({
            "timestamp": format!("2026-08-06 12:00:0{i}"),
            "level": "INFO",
            "message": format!("log line {i}"),
        });
        if socket.send(WsMessage::Text(frame.to_string())).await.is_err() {
            return;
        }
    }
    let _ = socket.send(WsMessage::Close(None)).await;
}

async fn next_event(events: &mut broadcast::Receiver<ClientEvent>) -> ClientEvent {
    timeout(RECV_TIMEOUT, events.recv())
        .await
        .expect("timely event")
        .expect("open channel")
}

#[tokio::test]
async fn streams_entries_and_reports_disconnects() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new().route("/api/websocket/logs", get(ws_handler));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let client = PanelClient::new(&format!("http://{addr}"), Some("token".into())).expect("client");
    let mut events = client.subscribe_events();
    let handle = client.spawn_log_stream().await.expect("spawn");

    assert!(matches!(
        next_event(&mut events).await,
        ClientEvent::LogStreamConnected
    ));

    match next_event(&mut events).await {
        ClientEvent::Log(entry) => assert_eq!(entry.message, "log line 0"),
        other => panic!("unexpected event: {other:?}"),
    }
    match next_event(&mut events).await {
        ClientEvent::Log(entry) => assert_eq!(entry.message, "log line 1"),
        other => panic!("unexpected event: {other:?}"),
    }

    assert!(matches!(
        next_event(&mut events).await,
        ClientEvent::LogStreamDisconnected { .. }
    ));

    let logs = client.recent_logs().await;
    assert_eq!(logs.len(), 2);

    assert!(handle.is_running());
    handle.stop();
}
