use super::{normalize_server_url, settings_from_sources, Settings};

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = settings_from_sources(None, env_from(&[])).expect("settings");
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let raw = r#"
server_url = "https://store.example.com"
auth_token = "file-token"
request_timeout_secs = 3
"#;
    let settings = settings_from_sources(Some(raw), env_from(&[])).expect("settings");
    assert_eq!(settings.server_url, "https://store.example.com");
    assert_eq!(settings.auth_token.as_deref(), Some("file-token"));
    assert_eq!(settings.request_timeout_secs, 3);
}

#[test]
fn app_prefixed_env_wins_over_file_and_legacy_env() {
    let raw = r#"server_url = "https://file.example.com""#;
    let settings = settings_from_sources(
        Some(raw),
        env_from(&[
            ("ADMIN_SERVER_URL", "https://legacy.example.com"),
            ("APP__SERVER_URL", "https://env.example.com"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.server_url, "https://env.example.com");
    assert_eq!(settings.request_timeout_secs, 10);
}

#[test]
fn empty_token_env_clears_file_token() {
    let raw = r#"auth_token = "file-token""#;
    let settings = settings_from_sources(Some(raw), env_from(&[("APP__AUTH_TOKEN", "")]))
        .expect("settings");
    assert_eq!(settings.auth_token, None);
}

#[test]
fn malformed_file_is_rejected() {
    assert!(settings_from_sources(Some("server_url = ["), env_from(&[])).is_err());
}

#[test]
fn normalizes_bare_host_to_http_url() {
    assert_eq!(
        normalize_server_url("localhost:8080/").expect("url"),
        "http://localhost:8080"
    );
    assert_eq!(
        normalize_server_url(" https://store.example.com/ ").expect("url"),
        "https://store.example.com"
    );
}

#[test]
fn rejects_non_http_schemes() {
    let err = normalize_server_url("ftp://store.example.com").expect_err("must fail");
    assert!(err.to_string().contains("http"), "unexpected error: {err}");
}

#[test]
fn zero_timeout_is_clamped() {
    let settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout().as_secs(), 1);
}
