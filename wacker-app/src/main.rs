use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use wacker_common::observability::init_logging;
use wacker_config::{WackerConfig, WackerConfigLoader, WikiMode, default_config_path};
use wacker_web::Extractor;

/// Extract the main content of a wiki or web page as `{success, title, content}` JSON.
#[derive(Debug, Parser)]
#[command(name = "wacker", version)]
struct Cli {
    /// Page URL, including the scheme (https://...).
    url: String,

    /// Config file (YAML/TOML/JSON). Defaults to `<config dir>/wacker/wacker.yaml` if present.
    #[arg(short, long, env = "WACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// How wiki pages are read: `api` or `raw_html`.
    #[arg(long)]
    wiki_mode: Option<WikiMode>,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pretty: bool,
}

fn load_config(cli: &Cli) -> Result<WackerConfig> {
    let loader = match (&cli.config, default_config_path()) {
        (Some(path), _) => WackerConfigLoader::new().with_file(path),
        (None, Some(default)) => WackerConfigLoader::new().with_optional_file(default),
        (None, None) => WackerConfigLoader::new(),
    };
    let mut cfg = loader.load().context("failed to load configuration")?;

    // Flags win over file and env.
    if let Some(secs) = cli.timeout_secs {
        cfg.http.timeout_secs = secs;
    }
    if let Some(mode) = cli.wiki_mode {
        cfg.wiki.mode = mode;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    let log_path = init_logging(cfg.log.to_log_config("wacker"))?;
    tracing::debug!(log_path = %log_path.display(), "logging.ready");

    let extractor = Extractor::new(&cfg).context("failed to build HTTP client")?;
    let result = extractor.extract(&cli.url).await;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{rendered}");

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
