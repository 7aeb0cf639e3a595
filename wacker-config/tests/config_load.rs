use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;
use wacker_common::observability::LogFormat;
use wacker_config::{HostPolicy, WackerConfigLoader, WikiMode, DEFAULT_USER_AGENT};

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
http:
  user_agent: "WikiReader/2.0 (${WACKER_TEST_CONTACT})"
  timeout_secs: 30
  retries: 1
wiki:
  host_suffix: wiki.gg
  host_policy: wiki_only
  mode: raw_html
log:
  format: json
  stderr: true
  filter: "wacker_web=debug"
"#;
    let p = write_yaml(&tmp, "wacker.yaml", file_yaml);

    let config = temp_env::with_var("WACKER_TEST_CONTACT", Some("ops@example.org"), || {
        WackerConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config")
    });

    assert_eq!(config.http.user_agent, "WikiReader/2.0 (ops@example.org)");
    assert_eq!(config.http.timeout_secs, 30);
    assert_eq!(config.http.connect_timeout_secs, 5);
    assert_eq!(config.http.retries, 1);
    assert_eq!(config.wiki.host_suffix, "wiki.gg");
    assert_eq!(config.wiki.page_marker, "/wiki/");
    assert_eq!(config.wiki.host_policy, HostPolicy::WikiOnly);
    assert_eq!(config.wiki.mode, WikiMode::RawHtml);
    assert_eq!(config.log.format, LogFormat::Json);
    assert!(config.log.stderr);
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "wacker.yaml", "http:\n  timeout_secs: 30\n");

    let config = temp_env::with_vars(
        [
            ("WACKER__HTTP__TIMEOUT_SECS", Some("3")),
            ("WACKER__WIKI__MODE", Some("raw_html")),
        ],
        || {
            WackerConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config")
        },
    );

    assert_eq!(config.http.timeout_secs, 3);
    assert_eq!(config.wiki.mode, WikiMode::RawHtml);
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = WackerConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");

    assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(config.http.timeout_secs, 15);
    assert_eq!(config.http.retries, 0);
    assert_eq!(config.wiki.host_suffix, "fandom.com");
    assert_eq!(config.wiki.host_policy, HostPolicy::Any);
    assert_eq!(config.wiki.mode, WikiMode::Api);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let res = WackerConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(res.is_err());
}

#[test]
#[serial]
fn empty_page_marker_is_rejected() {
    let res = WackerConfigLoader::new()
        .with_yaml_str("wiki:\n  page_marker: \"\"\n")
        .load();
    assert!(res.is_err());
}
