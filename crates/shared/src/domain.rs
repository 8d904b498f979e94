use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Resource packs are addressed by the UUID from their manifest header.
pub type PackUuid = uuid::Uuid;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(Xuid);
string_id!(QuickCommandId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    Visitor,
    Member,
    Operator,
}

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 3] = [
        PermissionLevel::Visitor,
        PermissionLevel::Member,
        PermissionLevel::Operator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Visitor => "visitor",
            PermissionLevel::Member => "member",
            PermissionLevel::Operator => "operator",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission level '{0}', expected visitor, member or operator")]
pub struct ParsePermissionLevelError(String);

impl FromStr for PermissionLevel {
    type Err = ParsePermissionLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visitor" => Ok(PermissionLevel::Visitor),
            "member" => Ok(PermissionLevel::Member),
            "operator" => Ok(PermissionLevel::Operator),
            other => Err(ParsePermissionLevelError(other.to_string())),
        }
    }
}

/// Lifecycle state reported by `GET /api/status`. The backend only ever
/// reports `running` or `stopped`; anything else collapses to `Unknown`
/// instead of failing the decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerState {
    Running,
    Stopped,
    Unknown,
}

impl ServerState {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "running" => ServerState::Running,
            "stopped" => ServerState::Stopped,
            _ => ServerState::Unknown,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ServerState::Running)
    }
}

impl<'de> Deserialize<'de> for ServerState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(ServerState::from_wire(&value))
    }
}

/// State of a server-version download as reported by the progress route.
/// `downloading` and `extracting` are the in-flight states; everything
/// else means the download has settled one way or the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    Downloading,
    Extracting,
    Completed,
    Error,
    Unknown,
}

impl DownloadState {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "downloading" => DownloadState::Downloading,
            "extracting" => DownloadState::Extracting,
            "completed" => DownloadState::Completed,
            "error" => DownloadState::Error,
            _ => DownloadState::Unknown,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, DownloadState::Downloading | DownloadState::Extracting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Downloading => "downloading",
            DownloadState::Extracting => "extracting",
            DownloadState::Completed => "completed",
            DownloadState::Error => "error",
            DownloadState::Unknown => "unknown",
        }
    }
}

impl<'de> Deserialize<'de> for DownloadState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(DownloadState::from_wire(&value))
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
