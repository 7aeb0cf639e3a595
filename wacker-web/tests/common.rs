#![allow(dead_code)]

use std::sync::OnceLock;

use wacker_common::observability::{LogConfig, LogFormat, LogRotation};
use wacker_config::{WackerConfig, WikiSettings};
use wacker_web::Extractor;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "wacker-tests",
            log_dir: Some(std::env::temp_dir().join("wacker-tests")),
            file_prefix: None,
            rotation: LogRotation::Never,
            emit_stderr: true,
            format: if std::env::var("WACKER_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".into(),
        };

        wacker_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Treats the mock server's host as a wiki host.
pub fn mediawiki_settings() -> WikiSettings {
    WikiSettings {
        host_suffix: "127.0.0.1".into(),
        ..WackerConfig::default().wiki
    }
}

pub fn extractor_for(wiki: WikiSettings) -> Extractor {
    let mut config = WackerConfig::default();
    config.http.user_agent = "WackerTest/1.0".into();
    config.http.timeout_secs = 5;
    config.wiki = wiki;
    Extractor::new(&config).expect("extractor")
}
