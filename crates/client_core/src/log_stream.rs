//! Live log tail over `/api/websocket/logs`.
//!
//! The backend replays up to 100 recent entries on connect and then streams
//! live ones, one JSON record per text frame. The client keeps the last
//! [`LOG_BUFFER_CAP`] entries and reconnects unconditionally after a fixed
//! delay whenever the socket closes or errors; there is no backoff and no
//! retry cap. Teardown is by aborting the task handle.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use shared::protocol::ServerLogEntry;

use crate::{ClientError, ClientEvent, PanelClient};

pub(crate) const LOG_BUFFER_CAP: usize = 1000;
pub(crate) const RECONNECT_DELAY: Duration = Duration::from_secs(3);

pub struct LogStreamHandle {
    task: JoinHandle<()>,
}

impl LogStreamHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for LogStreamHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl PanelClient {
    /// The log socket authenticates through a `token` query parameter, not
    /// the Authorization header.
    pub(crate) async fn log_stream_url(&self) -> Result<String, ClientError> {
        let token = self.token().await.ok_or(ClientError::MissingToken)?;
        let base = self.base_url().as_str().trim_end_matches('/').to_string();
        let ws_base = if base.starts_with("https://") {
            base.replacen("https://", "wss://", 1)
        } else if base.starts_with("http://") {
            base.replacen("http://", "ws://", 1)
        } else {
            return Err(ClientError::UnsupportedScheme(
                self.base_url().scheme().to_string(),
            ));
        };
        Ok(format!("{ws_base}/api/websocket/logs?token={token}"))
    }

    pub async fn spawn_log_stream(self: &Arc<Self>) -> Result<LogStreamHandle, ClientError> {
        let ws_url = self.log_stream_url().await?;
        let client = Arc::clone(self);
        let task = tokio::spawn(async move {
            client.run_log_stream(ws_url).await;
        });
        Ok(LogStreamHandle { task })
    }

    async fn run_log_stream(self: Arc<Self>, ws_url: String) {
        loop {
            match connect_async(&ws_url).await {
                Ok((stream, _)) => {
                    debug!("log stream connected");
                    let _ = self.events.send(ClientEvent::LogStreamConnected);
                    let (_, mut reader) = stream.split();
                    let mut reason = "stream closed".to_string();
                    while let Some(frame) = reader.next().await {
                        match frame {
                            Ok(Message::Text(text)) => {
                                match serde_json::from_str::<ServerLogEntry>(&text) {
                                    Ok(entry) => self.push_log(entry).await,
                                    Err(err) => {
                                        warn!(%err, "skipping unparseable log frame");
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(err) => {
                                reason = err.to_string();
                                break;
                            }
                        }
                    }
                    let _ = self
                        .events
                        .send(ClientEvent::LogStreamDisconnected { reason });
                }
                Err(err) => {
                    debug!(%err, "log stream connect failed");
                    let _ = self.events.send(ClientEvent::LogStreamDisconnected {
                        reason: err.to_string(),
                    });
                }
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    pub(crate) async fn push_log(&self, entry: ServerLogEntry) {
        {
            let mut buffer = self.recent_logs.lock().await;
            if buffer.len() == LOG_BUFFER_CAP {
                buffer.pop_front();
            }
            buffer.push_back(entry.clone());
        }
        let _ = self.events.send(ClientEvent::Log(entry));
    }

    /// Snapshot of the retained tail, oldest first.
    pub async fn recent_logs(&self) -> Vec<ServerLogEntry> {
        self.recent_logs.lock().await.iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "tests/log_stream_tests.rs"]
mod tests;
