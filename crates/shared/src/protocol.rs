//! Wire payloads for the panel backend's `/api` surface.
//!
//! Field names follow the backend verbatim, which means a mix of casings:
//! Bedrock `server.properties` keys are kebab-case, allowlist entries use
//! camelCase, everything else is snake_case. Version routes wrap their
//! payloads in a `{ success, message, data }` envelope; the rest of the API
//! returns resource-keyed objects or a bare `{ message }` acknowledgment.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    DownloadState, PackUuid, PermissionLevel, QuickCommandId, ServerState, Xuid,
};

/// The backend marshals empty Go slices as JSON `null`; decode those as
/// empty collections instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Auth

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordResponse {
    pub message: String,
    pub success: bool,
}

/// Generic error body. Login failures may carry rate-limit detail on top of
/// the `error` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_until: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// ---------------------------------------------------------------------------
// Server control

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: ServerState,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<i32>,
}

/// Acknowledgment returned by every plain mutation route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Configuration

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "server-name")]
    pub server_name: String,
    pub gamemode: String,
    pub difficulty: String,
    #[serde(rename = "max-players")]
    pub max_players: u32,
    #[serde(rename = "server-port")]
    pub server_port: u16,
    #[serde(rename = "allow-cheats")]
    pub allow_cheats: bool,
    #[serde(rename = "allow-list")]
    pub allow_list: bool,
    #[serde(rename = "online-mode", default)]
    pub online_mode: bool,
    #[serde(rename = "level-name", default)]
    pub level_name: String,
    #[serde(rename = "default-player-permission-level", default)]
    pub default_player_permission_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub config: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfigRequest {
    pub config: ServerConfig,
}

// ---------------------------------------------------------------------------
// Allowlist

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowlistEntry {
    pub name: String,
    #[serde(rename = "ignoresPlayerLimit", default)]
    pub ignores_player_limit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowlistResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub allowlist: Vec<AllowlistEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddAllowlistRequest {
    pub name: String,
    #[serde(rename = "ignoresPlayerLimit")]
    pub ignores_player_limit: bool,
}

// ---------------------------------------------------------------------------
// Permissions

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub xuid: Xuid,
    pub level: PermissionLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<PermissionEntry>,
}

/// Permissions are set by player name; the backend resolves the XUID.
/// Removal goes by XUID path parameter instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePermissionRequest {
    pub name: String,
    pub level: PermissionLevel,
}

// ---------------------------------------------------------------------------
// Worlds

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldInfo {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub worlds: Vec<WorldInfo>,
}

// ---------------------------------------------------------------------------
// Resource packs

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePackInfo {
    pub name: String,
    pub uuid: PackUuid,
    pub version: [u32; 3],
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub folder_name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePacksResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_packs: Vec<ResourcePackInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPackResponse {
    pub message: String,
    pub resource_pack: ResourcePackInfo,
}

// ---------------------------------------------------------------------------
// Server versions

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerVersion {
    pub version: String,
    #[serde(default)]
    pub download_url: String,
    pub active: bool,
    pub downloaded: bool,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub version: String,
    pub progress: f64,
    pub status: DownloadState,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total_bytes: i64,
    #[serde(default)]
    pub downloaded_bytes: i64,
}

/// Envelope used only by the `/server-versions` routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct VersionEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

// ---------------------------------------------------------------------------
// Logs

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<ServerLogEntry>,
    #[serde(default)]
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Interaction (server console)

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionStatus {
    pub enabled: bool,
    #[serde(default)]
    pub platform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCommandRequest {
    pub command: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendCommandResponse {
    pub message: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHistoryEntry {
    pub command: String,
    pub response: String,
    pub timestamp: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<CommandHistoryEntry>,
    #[serde(default)]
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Quick commands

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickCommand {
    pub id: QuickCommandId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub command: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickCommandsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub commands: Vec<QuickCommand>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteQuickCommandResponse {
    pub message: String,
    pub command: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddQuickCommandResponse {
    pub message: String,
    pub command: QuickCommand,
}

// ---------------------------------------------------------------------------
// Performance monitoring

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemPerformance {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessPerformance {
    pub pid: i32,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub memory_mb: f64,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub system: SystemPerformance,
    pub bedrock: ProcessPerformance,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
