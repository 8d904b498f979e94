//! Panel configuration: defaults, then `panel.toml`, then environment
//! overrides. The file also persists the JWT issued by login and the chosen
//! display language.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::i18n::Lang;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub server_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_language")]
    pub language: Lang,
}

fn default_language() -> Lang {
    Lang::En
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            token: None,
            language: Lang::En,
        }
    }
}

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    dirs::config_dir()
        .map(|dir| dir.join("bedrock-panel").join("panel.toml"))
        .unwrap_or_else(|| PathBuf::from("panel.toml"))
}

pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<Settings>(&raw) {
            Ok(file_settings) => settings = file_settings,
            Err(err) => warn!(%err, path = %path.display(), "ignoring unreadable config file"),
        }
    }

    if let Ok(v) = env::var("PANEL_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = env::var("PANEL_TOKEN") {
        settings.token = Some(v);
    }
    if let Ok(v) = env::var("PANEL_LANG") {
        match v.parse::<Lang>() {
            Ok(lang) => settings.language = lang,
            Err(err) => warn!(%err, "ignoring PANEL_LANG"),
        }
    }

    settings
}

pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let rendered = toml::to_string_pretty(settings).context("failed to render config")?;
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
