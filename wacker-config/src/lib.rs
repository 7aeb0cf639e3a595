//! Loader for Wacker configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//! 1. built-in defaults (every field has one, so an empty file is valid)
//! 2. YAML/TOML/JSON files added with [`WackerConfigLoader::with_file`] or
//!    [`WackerConfigLoader::with_optional_file`], or inline YAML snippets
//! 3. `WACKER__`-prefixed environment variables (`WACKER__HTTP__TIMEOUT_SECS=30`)
//!
//! String values may reference `${VAR}` placeholders; they are expanded after
//! the merge.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use wacker_common::observability::{LogConfig, LogFormat, LogRotation};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Carries no contact. Wikis that enforce a user-agent policy expect one, so
/// deployments should set `http.user_agent` to something like
/// `MyTool/1.0 (ops@example.org)`.
pub const DEFAULT_USER_AGENT: &str = concat!("Wacker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WackerConfig {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub wiki: WikiSettings,
    #[serde(default)]
    pub log: LogSettings,
}

/// Outbound request behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Extra attempts on 429/5xx/network errors. Zero keeps failures terminal.
    #[serde(default)]
    pub retries: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retries: 0,
        }
    }
}

/// Which hosts count as wikis and how they are read.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiSettings {
    #[serde(default = "default_host_suffix")]
    pub host_suffix: String,
    #[serde(default = "default_page_marker")]
    pub page_marker: String,
    #[serde(default)]
    pub host_policy: HostPolicy,
    #[serde(default)]
    pub mode: WikiMode,
}

impl Default for WikiSettings {
    fn default() -> Self {
        Self {
            host_suffix: default_host_suffix(),
            page_marker: default_page_marker(),
            host_policy: HostPolicy::default(),
            mode: WikiMode::default(),
        }
    }
}

/// Host allowlist policy applied before any fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostPolicy {
    /// Wiki hosts use the wiki strategy, everything else the generic one.
    #[default]
    Any,
    /// Only wiki hosts are accepted.
    WikiOnly,
}

/// How pages on wiki hosts are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WikiMode {
    /// `api.php?action=parse` returning rendered HTML.
    #[default]
    Api,
    /// Raw page HTML cut at the content wrapper.
    RawHtml,
}

impl std::str::FromStr for WikiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "raw_html" | "raw-html" | "raw" => Ok(Self::RawHtml),
            other => Err(format!("unknown wiki mode: {other} (expected api or raw_html)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// File name stem; defaults to the binary name.
    #[serde(default)]
    pub file_prefix: Option<String>,
    #[serde(default)]
    pub rotation: LogRotation,
    #[serde(default)]
    pub stderr: bool,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            dir: None,
            file_prefix: None,
            rotation: LogRotation::default(),
            stderr: false,
            filter: default_log_filter(),
        }
    }
}

impl LogSettings {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            file_prefix: self.file_prefix.clone(),
            rotation: self.rotation,
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_host_suffix() -> String {
    "fandom.com".into()
}
fn default_page_marker() -> String {
    "/wiki/".into()
}
fn default_log_filter() -> String {
    "info".into()
}

/// `<config dir>/wacker/wacker.yaml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wacker").join("wacker.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (files + env overrides).
pub struct WackerConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for WackerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WackerConfigLoader {
    /// Start from defaults; `WACKER__` env overrides are applied last.
    ///
    /// ```
    /// use wacker_config::{HostPolicy, WackerConfigLoader};
    ///
    /// let config = WackerConfigLoader::new()
    ///     .with_yaml_str("wiki:\n  host_policy: wiki_only\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.wiki.host_policy, HostPolicy::WikiOnly);
    /// assert_eq!(config.wiki.host_suffix, "fandom.com");
    /// assert_eq!(config.http.timeout_secs, 15);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when it does not exist.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into typed config.
    ///
    /// ```
    /// use wacker_config::WackerConfigLoader;
    ///
    /// unsafe { std::env::set_var("WACKER_DOC_UA", "DocBot/1.0"); }
    ///
    /// let config = WackerConfigLoader::new()
    ///     .with_yaml_str("http:\n  user_agent: \"${WACKER_DOC_UA}\"\n")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.http.user_agent, "DocBot/1.0");
    ///
    /// unsafe { std::env::remove_var("WACKER_DOC_UA"); }
    /// ```
    pub fn load(self) -> Result<WackerConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("WACKER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Convert to serde_json::Value first so placeholders can be expanded.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: WackerConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        if typed.wiki.page_marker.is_empty() {
            return Err(ConfigError::Message(
                "wiki.page_marker must not be empty".into(),
            ));
        }

        Ok(typed)
    }
}
