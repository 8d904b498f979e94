//! Typed client for the panel backend's REST and WebSocket surface.
//!
//! [`PanelClient`] wraps every `/api` route with a typed method, carries the
//! JWT bearer token issued by login, and publishes side-band happenings
//! (log stream frames, download progress samples, request failures) on a
//! broadcast channel that front-ends subscribe to.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use url::Url;

use shared::domain::{PackUuid, PermissionLevel, QuickCommandId, Xuid};
use shared::error::ApiError;
use shared::protocol::{
    AddAllowlistRequest, AddQuickCommandResponse, AllowlistEntry, AllowlistResponse,
    CategoriesResponse, ChangePasswordRequest, ChangePasswordResponse, CommandHistoryEntry,
    ConfigResponse, DownloadProgress, ErrorBody, ExecuteQuickCommandResponse, HistoryResponse,
    InteractionStatus, LoginRequest, LoginResponse, LogsResponse, MessageResponse,
    PerformanceSnapshot, PermissionEntry, PermissionsResponse, QuickCommand,
    QuickCommandsResponse, ResourcePackInfo,
    ResourcePacksResponse, SendCommandRequest, SendCommandResponse, ServerConfig, ServerLogEntry,
    ServerStatus, ServerVersion, UpdateConfigRequest, UpdatePermissionRequest, UploadPackResponse,
    VersionEnvelope, WorldInfo, WorldsResponse,
};

pub mod error;
pub mod log_stream;
pub mod progress;

pub use error::ClientError;
pub use log_stream::LogStreamHandle;
pub use progress::DownloadOutcome;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Side-band events published by the client. Request/response results go
/// back to the caller directly; this channel carries everything that happens
/// outside a single call.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Log(ServerLogEntry),
    LogStreamConnected,
    LogStreamDisconnected { reason: String },
    Download(DownloadProgress),
    Error(String),
}

#[derive(Debug)]
pub struct PanelClient {
    http: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
    pub(crate) recent_logs: Mutex<VecDeque<ServerLogEntry>>,
    pub(crate) events: broadcast::Sender<ClientEvent>,
}

impl PanelClient {
    pub fn new(server_url: &str, token: Option<String>) -> Result<Arc<Self>, ClientError> {
        let base_url = Url::parse(server_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            http: Client::new(),
            base_url,
            token: RwLock::new(token),
            recent_logs: Mutex::new(VecDeque::new()),
            events,
        }))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ClientError::UnsupportedScheme(self.base_url.scheme().to_string()))?;
            path.pop_if_empty().push("api");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.read().await;
        match token.as_deref() {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(ClientError::MissingToken),
        }
    }

    /// Runs a request and decodes the 2xx body. Any failure is surfaced once
    /// on the event channel before it is handed back to the caller, who is
    /// free to no-op; the taxonomy never gets finer than [`ClientError`].
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let result = self.execute_inner(builder).await;
        if let Err(err) = &result {
            let _ = self.events.send(ClientEvent::Error(err.to_string()));
        }
        result
    }

    async fn execute_inner<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = builder.send().await.map_err(ClientError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let message = extract_error_message(response).await;
            return Err(ClientError::Api {
                status: status.as_u16(),
                error: ApiError::from_status(status.as_u16(), message),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.api_url(segments)?;
        let builder = self.authorized(self.http.get(url)).await?;
        self.execute(builder).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.api_url(segments)?;
        let builder = self.authorized(self.http.get(url).query(query)).await?;
        self.execute(builder).await
    }

    async fn post<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.api_url(segments)?;
        let builder = self.authorized(self.http.post(url)).await?;
        self.execute(builder).await
    }

    async fn post_body<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.api_url(segments)?;
        let builder = self.authorized(self.http.post(url).json(body)).await?;
        self.execute(builder).await
    }

    async fn put<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.api_url(segments)?;
        let builder = self.authorized(self.http.put(url)).await?;
        self.execute(builder).await
    }

    async fn put_body<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.api_url(segments)?;
        let builder = self.authorized(self.http.put(url).json(body)).await?;
        self.execute(builder).await
    }

    async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.api_url(segments)?;
        let builder = self.authorized(self.http.delete(url)).await?;
        self.execute(builder).await
    }

    async fn upload<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        field: &'static str,
        path: &Path,
    ) -> Result<T, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.zip")
            .to_string();
        let form = multipart::Form::new()
            .part(field, multipart::Part::bytes(bytes).file_name(file_name));
        let url = self.api_url(segments)?;
        let builder = self.authorized(self.http.post(url)).await?.multipart(form);
        self.execute(builder).await
    }
}

async fn extract_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.trim().is_empty() => {
            if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
                parsed.error
            } else if let Ok(parsed) = serde_json::from_str::<MessageResponse>(&body) {
                parsed.message
            } else {
                body
            }
        }
        _ => format!("HTTP {status}"),
    }
}

/// Unwraps the `{ success, message, data }` envelope the version routes use.
fn version_data<T>(envelope: VersionEnvelope<T>, context: &str) -> Result<T, ClientError> {
    envelope
        .data
        .ok_or_else(|| ClientError::Decode(format!("{context} response missing data")))
}

/// One method per backend operation. Front-ends depend on this trait so a
/// test double can stand in for the network.
#[async_trait]
pub trait PanelApi: Send + Sync {
    async fn login(&self, password: &str) -> Result<LoginResponse, ClientError>;
    async fn change_password(
        &self,
        current: &str,
        new: &str,
    ) -> Result<ChangePasswordResponse, ClientError>;

    async fn server_status(&self) -> Result<ServerStatus, ClientError>;
    async fn start_server(&self) -> Result<String, ClientError>;
    async fn stop_server(&self) -> Result<String, ClientError>;
    async fn restart_server(&self) -> Result<String, ClientError>;

    async fn config(&self) -> Result<ServerConfig, ClientError>;
    async fn update_config(&self, config: &ServerConfig) -> Result<String, ClientError>;

    async fn allowlist(&self) -> Result<Vec<AllowlistEntry>, ClientError>;
    async fn add_to_allowlist(
        &self,
        name: &str,
        ignores_player_limit: bool,
    ) -> Result<String, ClientError>;
    async fn remove_from_allowlist(&self, name: &str) -> Result<String, ClientError>;

    async fn permissions(&self) -> Result<Vec<PermissionEntry>, ClientError>;
    async fn set_permission(
        &self,
        name: &str,
        level: PermissionLevel,
    ) -> Result<String, ClientError>;
    async fn remove_permission(&self, xuid: &Xuid) -> Result<String, ClientError>;

    async fn worlds(&self) -> Result<Vec<WorldInfo>, ClientError>;
    async fn upload_world(&self, path: &Path) -> Result<String, ClientError>;
    async fn delete_world(&self, name: &str) -> Result<String, ClientError>;
    async fn activate_world(&self, name: &str) -> Result<String, ClientError>;

    async fn resource_packs(&self) -> Result<Vec<ResourcePackInfo>, ClientError>;
    async fn upload_resource_pack(&self, path: &Path) -> Result<UploadPackResponse, ClientError>;
    async fn activate_resource_pack(&self, uuid: &PackUuid) -> Result<String, ClientError>;
    async fn deactivate_resource_pack(&self, uuid: &PackUuid) -> Result<String, ClientError>;
    async fn delete_resource_pack(&self, uuid: &PackUuid) -> Result<String, ClientError>;

    async fn server_versions(&self) -> Result<Vec<ServerVersion>, ClientError>;
    async fn download_version(&self, version: &str) -> Result<String, ClientError>;
    async fn download_progress(&self, version: &str) -> Result<DownloadProgress, ClientError>;
    async fn activate_version(&self, version: &str) -> Result<String, ClientError>;
    async fn refresh_version_catalog(&self) -> Result<Vec<ServerVersion>, ClientError>;

    async fn logs(&self, limit: usize) -> Result<Vec<ServerLogEntry>, ClientError>;
    async fn clear_logs(&self) -> Result<String, ClientError>;

    async fn interaction_status(&self) -> Result<InteractionStatus, ClientError>;
    async fn send_command(&self, command: &str) -> Result<SendCommandResponse, ClientError>;
    async fn command_history(&self, limit: usize) -> Result<Vec<CommandHistoryEntry>, ClientError>;
    async fn clear_command_history(&self) -> Result<String, ClientError>;

    async fn quick_commands(&self, category: Option<&str>) -> Result<Vec<QuickCommand>, ClientError>;
    async fn command_categories(&self) -> Result<Vec<String>, ClientError>;
    async fn execute_quick_command(
        &self,
        id: &QuickCommandId,
    ) -> Result<ExecuteQuickCommandResponse, ClientError>;
    async fn add_quick_command(&self, command: &QuickCommand) -> Result<String, ClientError>;
    async fn remove_quick_command(&self, id: &QuickCommandId) -> Result<String, ClientError>;

    async fn performance(&self) -> Result<PerformanceSnapshot, ClientError>;
}

#[async_trait]
impl PanelApi for PanelClient {
    async fn login(&self, password: &str) -> Result<LoginResponse, ClientError> {
        let url = self.api_url(&["auth", "login"])?;
        let builder = self.http.post(url).json(&LoginRequest {
            password: password.to_string(),
        });
        let response: LoginResponse = self.execute(builder).await?;
        *self.token.write().await = Some(response.token.clone());
        Ok(response)
    }

    async fn change_password(
        &self,
        current: &str,
        new: &str,
    ) -> Result<ChangePasswordResponse, ClientError> {
        self.post_body(
            &["auth", "change-password"],
            &ChangePasswordRequest {
                current_password: current.to_string(),
                new_password: new.to_string(),
            },
        )
        .await
    }

    async fn server_status(&self) -> Result<ServerStatus, ClientError> {
        self.get(&["status"]).await
    }

    async fn start_server(&self) -> Result<String, ClientError> {
        let response: MessageResponse = self.post(&["start"]).await?;
        Ok(response.message)
    }

    async fn stop_server(&self) -> Result<String, ClientError> {
        let response: MessageResponse = self.post(&["stop"]).await?;
        Ok(response.message)
    }

    async fn restart_server(&self) -> Result<String, ClientError> {
        let response: MessageResponse = self.post(&["restart"]).await?;
        Ok(response.message)
    }

    async fn config(&self) -> Result<ServerConfig, ClientError> {
        let response: ConfigResponse = self.get(&["config"]).await?;
        Ok(response.config)
    }

    async fn update_config(&self, config: &ServerConfig) -> Result<String, ClientError> {
        let response: MessageResponse = self
            .put_body(
                &["config"],
                &UpdateConfigRequest {
                    config: config.clone(),
                },
            )
            .await?;
        Ok(response.message)
    }

    async fn allowlist(&self) -> Result<Vec<AllowlistEntry>, ClientError> {
        let response: AllowlistResponse = self.get(&["allowlist"]).await?;
        Ok(response.allowlist)
    }

    async fn add_to_allowlist(
        &self,
        name: &str,
        ignores_player_limit: bool,
    ) -> Result<String, ClientError> {
        let response: MessageResponse = self
            .post_body(
                &["allowlist"],
                &AddAllowlistRequest {
                    name: name.to_string(),
                    ignores_player_limit,
                },
            )
            .await?;
        Ok(response.message)
    }

    async fn remove_from_allowlist(&self, name: &str) -> Result<String, ClientError> {
        let response: MessageResponse = self.delete(&["allowlist", name]).await?;
        Ok(response.message)
    }

    async fn permissions(&self) -> Result<Vec<PermissionEntry>, ClientError> {
        let response: PermissionsResponse = self.get(&["permissions"]).await?;
        Ok(response.permissions)
    }

    async fn set_permission(
        &self,
        name: &str,
        level: PermissionLevel,
    ) -> Result<String, ClientError> {
        let response: MessageResponse = self
            .put_body(
                &["permissions"],
                &UpdatePermissionRequest {
                    name: name.to_string(),
                    level,
                },
            )
            .await?;
        Ok(response.message)
    }

    async fn remove_permission(&self, xuid: &Xuid) -> Result<String, ClientError> {
        let response: MessageResponse = self.delete(&["permissions", &xuid.0]).await?;
        Ok(response.message)
    }

    async fn worlds(&self) -> Result<Vec<WorldInfo>, ClientError> {
        let response: WorldsResponse = self.get(&["worlds"]).await?;
        Ok(response.worlds)
    }

    async fn upload_world(&self, path: &Path) -> Result<String, ClientError> {
        let response: MessageResponse = self.upload(&["worlds", "upload"], "world", path).await?;
        Ok(response.message)
    }

    async fn delete_world(&self, name: &str) -> Result<String, ClientError> {
        let response: MessageResponse = self.delete(&["worlds", name]).await?;
        Ok(response.message)
    }

    async fn activate_world(&self, name: &str) -> Result<String, ClientError> {
        let response: MessageResponse = self.put(&["worlds", name, "activate"]).await?;
        Ok(response.message)
    }

    async fn resource_packs(&self) -> Result<Vec<ResourcePackInfo>, ClientError> {
        let response: ResourcePacksResponse = self.get(&["resource-packs"]).await?;
        Ok(response.resource_packs)
    }

    async fn upload_resource_pack(&self, path: &Path) -> Result<UploadPackResponse, ClientError> {
        self.upload(&["resource-packs", "upload"], "resource_pack", path)
            .await
    }

    async fn activate_resource_pack(&self, uuid: &PackUuid) -> Result<String, ClientError> {
        let uuid = uuid.to_string();
        let response: MessageResponse = self.put(&["resource-packs", &uuid, "activate"]).await?;
        Ok(response.message)
    }

    async fn deactivate_resource_pack(&self, uuid: &PackUuid) -> Result<String, ClientError> {
        let uuid = uuid.to_string();
        let response: MessageResponse = self.put(&["resource-packs", &uuid, "deactivate"]).await?;
        Ok(response.message)
    }

    async fn delete_resource_pack(&self, uuid: &PackUuid) -> Result<String, ClientError> {
        let uuid = uuid.to_string();
        let response: MessageResponse = self.delete(&["resource-packs", &uuid]).await?;
        Ok(response.message)
    }

    async fn server_versions(&self) -> Result<Vec<ServerVersion>, ClientError> {
        let envelope: VersionEnvelope<Vec<ServerVersion>> = self.get(&["server-versions"]).await?;
        version_data(envelope, "server versions")
    }

    async fn download_version(&self, version: &str) -> Result<String, ClientError> {
        let envelope: VersionEnvelope<()> =
            self.post(&["server-versions", version, "download"]).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    async fn download_progress(&self, version: &str) -> Result<DownloadProgress, ClientError> {
        let envelope: VersionEnvelope<DownloadProgress> =
            self.get(&["server-versions", version, "progress"]).await?;
        version_data(envelope, "download progress")
    }

    async fn activate_version(&self, version: &str) -> Result<String, ClientError> {
        let envelope: VersionEnvelope<()> =
            self.put(&["server-versions", version, "activate"]).await?;
        Ok(envelope.message.unwrap_or_default())
    }

    async fn refresh_version_catalog(&self) -> Result<Vec<ServerVersion>, ClientError> {
        let envelope: VersionEnvelope<Vec<ServerVersion>> =
            self.post(&["server-versions", "update-config"]).await?;
        version_data(envelope, "version catalog")
    }

    async fn logs(&self, limit: usize) -> Result<Vec<ServerLogEntry>, ClientError> {
        let response: LogsResponse = self
            .get_with_query(&["logs"], &[("limit", limit.to_string())])
            .await?;
        Ok(response.logs)
    }

    async fn clear_logs(&self) -> Result<String, ClientError> {
        let response: MessageResponse = self.delete(&["logs"]).await?;
        Ok(response.message)
    }

    async fn interaction_status(&self) -> Result<InteractionStatus, ClientError> {
        self.get(&["interaction", "status"]).await
    }

    async fn send_command(&self, command: &str) -> Result<SendCommandResponse, ClientError> {
        self.post_body(
            &["interaction", "command"],
            &SendCommandRequest {
                command: command.to_string(),
                timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            },
        )
        .await
    }

    async fn command_history(&self, limit: usize) -> Result<Vec<CommandHistoryEntry>, ClientError> {
        let response: HistoryResponse = self
            .get_with_query(&["interaction", "history"], &[("limit", limit.to_string())])
            .await?;
        Ok(response.history)
    }

    async fn clear_command_history(&self) -> Result<String, ClientError> {
        let response: MessageResponse = self.delete(&["interaction", "history"]).await?;
        Ok(response.message)
    }

    async fn quick_commands(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<QuickCommand>, ClientError> {
        let response: QuickCommandsResponse = match category {
            Some(category) => {
                self.get_with_query(&["commands"], &[("category", category.to_string())])
                    .await?
            }
            None => self.get(&["commands"]).await?,
        };
        Ok(response.commands)
    }

    async fn command_categories(&self) -> Result<Vec<String>, ClientError> {
        let response: CategoriesResponse = self.get(&["commands", "categories"]).await?;
        Ok(response.categories)
    }

    async fn execute_quick_command(
        &self,
        id: &QuickCommandId,
    ) -> Result<ExecuteQuickCommandResponse, ClientError> {
        self.post(&["commands", &id.0, "execute"]).await
    }

    async fn add_quick_command(&self, command: &QuickCommand) -> Result<String, ClientError> {
        let response: AddQuickCommandResponse = self.post_body(&["commands"], command).await?;
        Ok(response.message)
    }

    async fn remove_quick_command(&self, id: &QuickCommandId) -> Result<String, ClientError> {
        let response: MessageResponse = self.delete(&["commands", &id.0]).await?;
        Ok(response.message)
    }

    async fn performance(&self) -> Result<PerformanceSnapshot, ClientError> {
        self.get(&["monitor", "performance"]).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
