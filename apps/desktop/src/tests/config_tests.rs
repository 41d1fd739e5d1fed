use super::{load_settings_with, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use client_core::AcceptPolicy;

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("resumematch_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("create dir");
    let path = dir.join("resumematch.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings_with(&PathBuf::from("/nonexistent/resumematch.toml"), no_env);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.api_base_url, "http://localhost:8000");
    assert_eq!(settings.accept_policy(), AcceptPolicy::Documents);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config(
        "api_base_url = \"http://backend:9000\"\nrequest_timeout_secs = 5\naccept_text_uploads = true\n",
    );
    let settings = load_settings_with(&path, no_env);

    assert_eq!(settings.api_base_url, "http://backend:9000");
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(settings.accept_policy(), AcceptPolicy::DocumentsAndText);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn environment_overrides_file() {
    let path = temp_config("api_base_url = \"http://from-file:1\"\n");
    let vars: HashMap<&str, &str> = HashMap::from([
        ("RESUMEMATCH_API_URL", "http://legacy:2"),
        ("APP__API_BASE_URL", "http://from-env:3"),
        ("APP__REQUEST_TIMEOUT_SECS", "12"),
    ]);
    let settings = load_settings_with(&path, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.api_base_url, "http://from-env:3");
    assert_eq!(settings.request_timeout_secs, 12);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn malformed_values_are_ignored() {
    let path = temp_config("request_timeout_secs = \"soon\"\n");
    let vars: HashMap<&str, &str> = HashMap::from([("APP__ACCEPT_TEXT_UPLOADS", "maybe")]);
    let settings = load_settings_with(&path, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings, Settings::default());

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn zero_timeout_keeps_previous_value() {
    let path = temp_config("request_timeout_secs = 0\n");
    let settings = load_settings_with(&path, no_env);
    assert_eq!(settings.request_timeout_secs, 30);

    let vars: HashMap<&str, &str> = HashMap::from([("APP__REQUEST_TIMEOUT_SECS", "0")]);
    let settings = load_settings_with(&path, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(settings.request_timeout_secs, 30);
    assert!(!settings.request_timeout().is_zero());

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}
