use super::*;

use std::collections::HashSet;

#[test]
fn lookup_returns_language_specific_text() {
    let en = Catalog::new(Lang::En);
    let zh = Catalog::new(Lang::Zh);
    assert_eq!(en.t("allowlist.empty"), "No allowlist users");
    assert_eq!(zh.t("allowlist.empty"), "暂无白名单用户");
}

#[test]
fn unknown_keys_fall_back_to_the_key_itself() {
    let catalog = Catalog::new(Lang::En);
    assert_eq!(catalog.t("no.such.key"), "no.such.key");
}

#[test]
fn placeholders_are_substituted() {
    let catalog = Catalog::new(Lang::En);
    let text = catalog.t_with("world.delete-confirm", &[("worldName", "skyblock")]);
    assert!(text.contains("\"skyblock\""));
    assert!(!text.contains("{worldName}"));

    let text = catalog.t_with("logs.stream.disconnected", &[("reason", "connection reset")]);
    assert!(text.ends_with("connection reset"));
}

#[test]
fn lang_parses_and_displays() {
    assert_eq!("en".parse::<Lang>().unwrap(), Lang::En);
    assert_eq!("zh".parse::<Lang>().unwrap(), Lang::Zh);
    assert_eq!(Lang::Zh.to_string(), "zh");

    let err = "fr".parse::<Lang>().unwrap_err();
    assert!(err.to_string().contains("fr"));
}

#[test]
fn table_keys_are_unique() {
    let mut seen = HashSet::new();
    for (key, _, _) in TABLE {
        assert!(seen.insert(*key), "duplicate catalog key {key}");
    }
}
