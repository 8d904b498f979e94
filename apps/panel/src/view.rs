//! Render functions for the panel front-end.
//!
//! Each list renderer takes the records plus the string catalog and returns
//! freshly built display rows; an empty slice yields exactly one row, the
//! localized empty placeholder. Nothing here talks to the network.

use shared::protocol::{
    AllowlistEntry, CommandHistoryEntry, DownloadProgress, PerformanceSnapshot, PermissionEntry,
    QuickCommand, ResourcePackInfo, ServerConfig, ServerLogEntry, ServerStatus, ServerVersion,
    WorldInfo,
};

use crate::i18n::Catalog;

pub fn toast_ok(message: &str) -> String {
    format!("✔ {message}")
}

pub fn toast_err(message: &str) -> String {
    format!("✖ {message}")
}

pub fn render_status(status: &ServerStatus, catalog: &Catalog) -> String {
    let label = match status.status {
        shared::domain::ServerState::Running => catalog.t("nav.status.running"),
        shared::domain::ServerState::Stopped => catalog.t("nav.status.stopped"),
        shared::domain::ServerState::Unknown => catalog.t("nav.status.unknown"),
    };
    match status.pid {
        Some(pid) => format!("[{label}] {} (pid {pid})", status.message),
        None => format!("[{label}] {}", status.message),
    }
}

pub fn render_allowlist(entries: &[AllowlistEntry], catalog: &Catalog) -> Vec<String> {
    if entries.is_empty() {
        return vec![catalog.t("allowlist.empty")];
    }
    entries
        .iter()
        .map(|entry| {
            if entry.ignores_player_limit {
                format!("{} ({})", entry.name, catalog.t("allowlist.ignores-limit"))
            } else {
                entry.name.clone()
            }
        })
        .collect()
}

pub fn render_permissions(entries: &[PermissionEntry], catalog: &Catalog) -> Vec<String> {
    if entries.is_empty() {
        return vec![catalog.t("permission.empty")];
    }
    entries
        .iter()
        .map(|entry| {
            let label = catalog.t(&format!("permission.level.{}", entry.level.as_str()));
            format!("{}  [{label}]", entry.xuid)
        })
        .collect()
}

pub fn render_worlds(worlds: &[WorldInfo], catalog: &Catalog) -> Vec<String> {
    if worlds.is_empty() {
        return vec![catalog.t("world.empty")];
    }
    worlds
        .iter()
        .map(|world| {
            if world.active {
                format!("{} [{}]", world.name, catalog.t("world.current"))
            } else {
                world.name.clone()
            }
        })
        .collect()
}

pub fn render_resource_packs(packs: &[ResourcePackInfo], catalog: &Catalog) -> Vec<String> {
    if packs.is_empty() {
        return vec![catalog.t("pack.empty")];
    }
    packs
        .iter()
        .map(|pack| {
            let mut line = format!(
                "{} v{}  ({})",
                pack.name,
                format_version(&pack.version),
                pack.uuid
            );
            if pack.active {
                line.push_str(&format!(" [{}]", catalog.t("pack.active")));
            }
            line
        })
        .collect()
}

pub fn render_versions(versions: &[ServerVersion], catalog: &Catalog) -> Vec<String> {
    if versions.is_empty() {
        return vec![catalog.t("version.empty")];
    }
    versions
        .iter()
        .map(|version| {
            let mut line = version.version.clone();
            if version.downloaded {
                line.push_str(&format!(" [{}]", catalog.t("version.downloaded")));
            }
            if version.active {
                line.push_str(&format!(" [{}]", catalog.t("version.active")));
            }
            if let Some(release_date) = &version.release_date {
                line.push_str(&format!("  {release_date}"));
            }
            line
        })
        .collect()
}

pub fn log_line(entry: &ServerLogEntry) -> String {
    format!("[{}] [{}] {}", entry.timestamp, entry.level, entry.message)
}

pub fn render_logs(entries: &[ServerLogEntry], catalog: &Catalog) -> Vec<String> {
    if entries.is_empty() {
        return vec![catalog.t("logs.empty")];
    }
    entries.iter().map(log_line).collect()
}

pub fn render_history(entries: &[CommandHistoryEntry], catalog: &Catalog) -> Vec<String> {
    if entries.is_empty() {
        return vec![catalog.t("history.empty")];
    }
    entries
        .iter()
        .map(|entry| {
            let marker = if entry.success { "✔" } else { "✖" };
            format!(
                "{marker} [{}] {} -> {}",
                entry.timestamp, entry.command, entry.response
            )
        })
        .collect()
}

pub fn render_quick_commands(commands: &[QuickCommand], catalog: &Catalog) -> Vec<String> {
    if commands.is_empty() {
        return vec![catalog.t("commands.empty")];
    }
    commands
        .iter()
        .map(|command| {
            format!(
                "{}  {} ({}) — {}",
                command.id, command.name, command.category, command.command
            )
        })
        .collect()
}

pub fn render_categories(categories: &[String], catalog: &Catalog) -> Vec<String> {
    if categories.is_empty() {
        return vec![catalog.t("categories.empty")];
    }
    categories.to_vec()
}

pub fn render_config(config: &ServerConfig) -> Vec<String> {
    vec![
        format!("server-name: {}", config.server_name),
        format!("gamemode: {}", config.gamemode),
        format!("difficulty: {}", config.difficulty),
        format!("max-players: {}", config.max_players),
        format!("server-port: {}", config.server_port),
        format!("allow-cheats: {}", config.allow_cheats),
        format!("allow-list: {}", config.allow_list),
        format!("online-mode: {}", config.online_mode),
        format!("level-name: {}", config.level_name),
        format!(
            "default-player-permission-level: {}",
            config.default_player_permission_level
        ),
    ]
}

pub fn render_performance(snapshot: &PerformanceSnapshot, catalog: &Catalog) -> Vec<String> {
    vec![
        format!(
            "{}: cpu {:.1}%  mem {:.1}%",
            catalog.t("monitor.system"),
            snapshot.system.cpu_usage,
            snapshot.system.memory_usage
        ),
        format!(
            "{}: pid {}  cpu {:.1}%  mem {:.1} MB",
            catalog.t("monitor.bedrock"),
            snapshot.bedrock.pid,
            snapshot.bedrock.cpu_usage,
            snapshot.bedrock.memory_mb
        ),
    ]
}

pub fn render_progress(progress: &DownloadProgress) -> String {
    format!(
        "{}: {:5.1}% [{}] {} ({}/{} bytes)",
        progress.version,
        progress.progress,
        progress.status.as_str(),
        progress.message,
        progress.downloaded_bytes,
        progress.total_bytes
    )
}

pub fn format_version(version: &[u32; 3]) -> String {
    format!("{}.{}.{}", version[0], version[1], version[2])
}

/// Case-insensitive substring filter over id, name, command and description,
/// the terminal analog of the quick-command filter box.
pub fn filter_quick_commands<'a>(commands: &'a [QuickCommand], query: &str) -> Vec<&'a QuickCommand> {
    let query = query.to_lowercase();
    commands
        .iter()
        .filter(|command| {
            command.id.0.to_lowercase().contains(&query)
                || command.name.to_lowercase().contains(&query)
                || command.command.to_lowercase().contains(&query)
                || command.description.to_lowercase().contains(&query)
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
