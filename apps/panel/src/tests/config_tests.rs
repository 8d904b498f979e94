use super::*;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::i18n::Lang;

fn temp_config_path() -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir()
        .join(format!("panel_config_test_{suffix}"))
        .join("panel.toml")
}

// Defaults, file contents and env overrides are exercised in one test so the
// process-global PANEL_* variables are only ever touched in one place.
#[test]
fn load_settings_merges_defaults_file_and_env() {
    let path = temp_config_path();

    let missing = load_settings(&path);
    assert_eq!(missing, Settings::default());
    assert_eq!(missing.server_url, "http://127.0.0.1:8080");
    assert_eq!(missing.language, Lang::En);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(&path, "this is not toml {{{{").expect("write");
    assert_eq!(load_settings(&path), Settings::default());

    let file_settings = Settings {
        server_url: "http://10.0.0.2:8080".into(),
        token: Some("stored-jwt".into()),
        language: Lang::Zh,
    };
    save_settings(&path, &file_settings).expect("save settings");
    assert_eq!(load_settings(&path), file_settings);

    std::env::set_var("PANEL_SERVER_URL", "http://env.example:9090");
    std::env::set_var("PANEL_TOKEN", "env-jwt");
    std::env::set_var("PANEL_LANG", "en");
    let overridden = load_settings(&path);
    std::env::remove_var("PANEL_SERVER_URL");
    std::env::remove_var("PANEL_TOKEN");
    std::env::remove_var("PANEL_LANG");

    assert_eq!(overridden.server_url, "http://env.example:9090");
    assert_eq!(overridden.token.as_deref(), Some("env-jwt"));
    assert_eq!(overridden.language, Lang::En);

    if let Some(parent) = path.parent() {
        let _ = std::fs::remove_dir_all(parent);
    }
}

#[test]
fn explicit_config_path_wins_over_the_config_dir() {
    let explicit = PathBuf::from("/tmp/custom-panel.toml");
    assert_eq!(config_path(Some(&explicit)), explicit);

    let derived = config_path(None);
    assert!(derived.ends_with("panel.toml"));
}

#[test]
fn settings_render_as_toml_without_an_absent_token() {
    let rendered = toml::to_string_pretty(&Settings::default()).expect("render");
    assert!(rendered.contains("server_url"));
    assert!(!rendered.contains("token"));

    let parsed: Settings = toml::from_str(&rendered).expect("parse");
    assert_eq!(parsed, Settings::default());
}
