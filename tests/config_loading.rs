// tests/config_loading.rs
//
// Config file resolution and env overrides. Env-mutating tests run serially.

use std::fs;

use serial_test::serial;

use otobot::config::{
    AssistantConfig, ENV_CONFIG_PATH, ENV_CORPUS_PATH, ENV_FUZZY_THRESHOLD,
};

fn clear_env() {
    std::env::remove_var(ENV_CONFIG_PATH);
    std::env::remove_var(ENV_CORPUS_PATH);
    std::env::remove_var(ENV_FUZZY_THRESHOLD);
}

#[test]
#[serial]
fn explicit_path_is_loaded_and_partial_file_keeps_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assistant.toml");
    fs::write(
        &path,
        "[assistant]\nname = \"TestBot\"\n\n[matching]\nfuzzy_threshold = 90.0\n",
    )
    .unwrap();
    std::env::set_var(ENV_CONFIG_PATH, &path);

    let cfg = AssistantConfig::load().expect("load");
    assert_eq!(cfg.assistant.name, "TestBot");
    assert_eq!(cfg.assistant.company, "Otofarma Spa");
    assert_eq!(cfg.matching.fuzzy_threshold, 90.0);
    assert_eq!(cfg.fallback.memory, 20);
    clear_env();
}

#[test]
#[serial]
fn explicit_missing_path_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(ENV_CONFIG_PATH, dir.path().join("missing.toml"));
    assert!(AssistantConfig::load().is_err());
    clear_env();
}

#[test]
#[serial]
fn env_overrides_win_and_are_clamped() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assistant.toml");
    fs::write(&path, "[matching]\nfuzzy_threshold = 70.0\n").unwrap();
    std::env::set_var(ENV_CONFIG_PATH, &path);
    std::env::set_var(ENV_FUZZY_THRESHOLD, "250");
    std::env::set_var(ENV_CORPUS_PATH, "/tmp/otobot-corpus");

    let cfg = AssistantConfig::load().expect("load");
    assert_eq!(cfg.matching.fuzzy_threshold, 100.0);
    assert_eq!(cfg.data.corpus_dir.to_string_lossy(), "/tmp/otobot-corpus");
    clear_env();
}

#[test]
#[serial]
fn unparsable_fuzzy_override_is_ignored() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assistant.toml");
    fs::write(&path, "").unwrap();
    std::env::set_var(ENV_CONFIG_PATH, &path);
    std::env::set_var(ENV_FUZZY_THRESHOLD, "molto");

    let cfg = AssistantConfig::load().expect("load");
    assert_eq!(cfg.matching.fuzzy_threshold, 85.0);
    clear_env();
}

#[test]
fn shipped_config_parses() {
    let content = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config/assistant.toml"))
        .expect("read shipped config");
    let cfg = AssistantConfig::from_toml_str(&content).expect("parse");
    assert_eq!(cfg.assistant.timezone, "Europe/Rome");
    assert!(!cfg.llm.enabled);
}

#[test]
fn invalid_timezone_falls_back_to_rome() {
    let cfg = AssistantConfig::from_toml_str("[assistant]\ntimezone = \"Mars/Olympus\"\n").unwrap();
    assert_eq!(cfg.assistant.timezone, "Europe/Rome");
}
