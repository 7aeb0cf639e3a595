//! The single entry point callers use: URL in, [`ExtractionResult`] out.
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use wacker_config::WackerConfig;
//! use wacker_web::Extractor;
//!
//! let extractor = Extractor::new(&WackerConfig::default())?;
//! let result = extractor
//!     .extract("https://growagarden.fandom.com/wiki/Crops")
//!     .await;
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(()) }
//! ```

use std::time::{Duration, Instant};
use wacker_common::{ExtractError, ExtractionResult, Page, Result};
use wacker_config::{WackerConfig, WikiSettings};
use wacker_http::{HttpClient, HttpError};

use crate::fetch::fetch_html;
use crate::strategy::{self, Strategy};
use crate::{extract, mediawiki, rewrite, wrapper};

// Placeholder anchor; every request is rebased onto its own origin.
const UNANCHORED_BASE: &str = "http://localhost/";

/// Stateless between calls; cloning shares the connection pool.
#[derive(Clone)]
pub struct Extractor {
    http: HttpClient,
    wiki: WikiSettings,
}

impl Extractor {
    pub fn new(config: &WackerConfig) -> std::result::Result<Self, HttpError> {
        let http = HttpClient::with_connect_timeout(
            UNANCHORED_BASE,
            Duration::from_secs(config.http.connect_timeout_secs),
        )?
        .with_timeout(Duration::from_secs(config.http.timeout_secs))
        .with_retries(config.http.retries)
        .with_user_agent(&config.http.user_agent)?
        .without_cache();

        Ok(Self {
            http,
            wiki: config.wiki.clone(),
        })
    }

    /// Never fails: every error is folded into [`ExtractionResult::Failure`].
    pub async fn extract(&self, url: &str) -> ExtractionResult {
        let t0 = Instant::now();
        let res = self.try_extract(url).await;
        let elapsed_ms = t0.elapsed().as_millis() as u64;
        match &res {
            Ok(page) => tracing::info!(
                target: "web.extract",
                url,
                title = %page.title,
                content_len = page.content.len(),
                elapsed_ms,
                "extract.ok"
            ),
            Err(err) => tracing::warn!(
                target: "web.extract",
                url,
                error = %err,
                elapsed_ms,
                "extract.failed"
            ),
        }
        ExtractionResult::from(res)
    }

    /// Select, fetch, extract, post-process.
    pub async fn try_extract(&self, url: &str) -> Result<Page> {
        let plan = strategy::select(url, &self.wiki)?;
        let http = self
            .http
            .rebase(&plan.origin)
            .map_err(|e| ExtractError::Unknown(e.to_string()))?;

        let raw = match &plan.strategy {
            Strategy::MediaWikiApi { page } => mediawiki::fetch_parsed_page(&http, page).await?,
            Strategy::WikiRawHtml { .. } => {
                let html = fetch_html(&http, &plan.url).await?;
                wrapper::extract_wrapped(&html, &plan.url)?
            }
            Strategy::GenericHtml => {
                let html = fetch_html(&http, &plan.url).await?;
                extract::extract_generic(&html, &plan.url)
            }
        };

        Ok(Page {
            content: rewrite::post_process(&raw.content, &plan.origin),
            title: raw.title,
        })
    }
}
