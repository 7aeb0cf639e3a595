//! Picks the fetch/extract strategy for a caller-supplied URL.
//!
//! Wiki hosts (host equal to, or a subdomain of, the configured suffix) must
//! carry a page name after the page marker; everything else is read as a
//! generic HTML page unless the deployment only accepts wiki hosts.

use url::Url;
use wacker_common::{ExtractError, Result};
use wacker_config::{HostPolicy, WikiMode, WikiSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Ask `<origin>/api.php` to render `page`.
    MediaWikiApi { page: String },
    /// Fetch the wiki page and cut at the content wrapper.
    WikiRawHtml { page: String },
    /// Fetch the page and pick a semantic container.
    GenericHtml,
}

/// A parsed request ready to be fetched.
#[derive(Debug, Clone)]
pub struct Plan {
    pub url: Url,
    /// `scheme://host[:port]`, used for absolutizing links.
    pub origin: String,
    pub strategy: Strategy,
}

pub fn select(raw: &str, wiki: &WikiSettings) -> Result<Plan> {
    let url = Url::parse(raw.trim()).map_err(|_| ExtractError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExtractError::InvalidUrl);
    }
    let host = url.host_str().ok_or(ExtractError::InvalidUrl)?;
    let origin = url.origin().ascii_serialization();

    let strategy = if host_matches(host, &wiki.host_suffix) {
        let page = page_name(url.path(), &wiki.page_marker).ok_or_else(|| {
            ExtractError::MissingPageName {
                marker: wiki.page_marker.clone(),
            }
        })?;
        match wiki.mode {
            WikiMode::Api => Strategy::MediaWikiApi { page },
            WikiMode::RawHtml => Strategy::WikiRawHtml { page },
        }
    } else if wiki.host_policy == HostPolicy::WikiOnly {
        return Err(ExtractError::HostNotAllowed {
            suffix: wiki.host_suffix.clone(),
        });
    } else {
        Strategy::GenericHtml
    };

    tracing::debug!(
        target: "web.extract",
        host,
        strategy = ?strategy,
        "strategy.selected"
    );

    Ok(Plan {
        url,
        origin,
        strategy,
    })
}

/// `host` is the suffix itself or one of its subdomains.
pub fn host_matches(host: &str, suffix: &str) -> bool {
    let suffix = suffix.trim().trim_start_matches('.');
    if suffix.is_empty() {
        return false;
    }
    let host = host.trim_end_matches('.');
    host.eq_ignore_ascii_case(suffix)
        || host
            .len()
            .checked_sub(suffix.len() + 1)
            .is_some_and(|dot| {
                host.as_bytes()[dot] == b'.' && host[dot + 1..].eq_ignore_ascii_case(suffix)
            })
}

/// Everything after the last page marker, percent-decoded. `None` when the
/// marker is absent or nothing follows it.
pub fn page_name(path: &str, marker: &str) -> Option<String> {
    let at = path.rfind(marker)?;
    let raw = &path[at + marker.len()..];
    if raw.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(decoded)
}
