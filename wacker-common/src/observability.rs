//! `tracing` setup shared by the binary and integration tests.
//!
//! Events go to a rolling file and, optionally, to `stderr`, in one encoding.
//! [`init_logging`] installs the global subscriber once; later calls return
//! the path resolved by the first.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type Filtered = Layered<EnvFilter, Registry>;
type Sink = Box<dyn Layer<Filtered> + Send + Sync>;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "WACKER_LOG_DIR";

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// How often the file sink starts a new file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    fn rotation(self) -> Rotation {
        match self {
            Self::Hourly => Rotation::HOURLY,
            Self::Daily => Rotation::DAILY,
            Self::Never => Rotation::NEVER,
        }
    }

    // Same suffix the appender writes; it rolls on UTC boundaries.
    fn suffix(self, now: DateTime<Utc>) -> Option<String> {
        match self {
            Self::Hourly => Some(now.format("%Y-%m-%d-%H").to_string()),
            Self::Daily => Some(now.format("%Y-%m-%d").to_string()),
            Self::Never => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used for the default directory and, absent `file_prefix`, the file name.
    pub app_name: &'static str,
    /// Falls back to `WACKER_LOG_DIR`, then `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    pub file_prefix: Option<String>,
    pub rotation: LogRotation,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "wacker",
            log_dir: None,
            file_prefix: None,
            rotation: LogRotation::Daily,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".into(),
        }
    }
}

impl LogConfig {
    fn file_name(&self) -> String {
        format!("{}.log", self.file_prefix.as_deref().unwrap_or(self.app_name))
    }

    /// File the appender is writing to at `now`.
    pub fn current_file(&self, dir: &Path, now: DateTime<Utc>) -> PathBuf {
        let name = self.file_name();
        match self.rotation.suffix(now) {
            Some(suffix) => dir.join(format!("{name}.{suffix}")),
            None => dir.join(name),
        }
    }
}

/// Installs the global subscriber and returns the current log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let appender = RollingFileAppender::new(config.rotation.rotation(), &dir, config.file_name());
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter.as_str()));

    let mut sinks: Vec<Sink> = vec![sink_layer(config.format, writer, false)];
    if config.emit_stderr {
        sinks.push(sink_layer(config.format, std::io::stderr, true));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(sinks)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let path = config.current_file(&dir, Utc::now());
    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

fn sink_layer<W>(format: LogFormat, writer: W, ansi: bool) -> Sink
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }
    match std::env::var(LOG_DIR_ENV) {
        Ok(env_dir) => expand_home(Path::new(&env_dir)),
        Err(_) => home_dir()
            .map(|home| home.join(".local").join("share").join(app_name))
            .unwrap_or_else(|| PathBuf::from(".").join(app_name)),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
