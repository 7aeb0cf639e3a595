//! Common types and utilities shared across Wacker crates.
//!
//! This crate defines the extraction result contract, the shared error
//! taxonomy, and observability helpers used throughout the Wacker workspace.
//! It is intentionally lightweight so that every crate can depend on it
//! without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`ExtractionResult`]: the caller-facing `{success, title, content}` /
//!   `{success, error}` record
//! - [`Page`]: a successfully extracted `{title, content}` pair
//! - [`ExtractError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! Serializing a failure for a UI or HTTP layer:
//!
//! ```rust
//! use wacker_common::{ExtractError, ExtractionResult};
//!
//! let result = ExtractionResult::from(Err::<wacker_common::Page, _>(ExtractError::MissingContent));
//! let json = serde_json::to_value(&result).unwrap();
//! assert_eq!(json["success"], false);
//! assert_eq!(json["error"], "Could not find content in the API response.");
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Title and HTML fragment extracted from a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Plain-text page title.
    pub title: String,
    /// HTML fragment (never a full document).
    pub content: String,
}

/// Outcome of one extraction call, as handed to UI/CLI/HTTP callers.
///
/// Serializes to `{"success": true, "title": .., "content": ..}` or
/// `{"success": false, "error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ResultWire", try_from = "ResultWire")]
pub enum ExtractionResult {
    Success { title: String, content: String },
    Failure { error: String },
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<Page>> for ExtractionResult {
    fn from(res: Result<Page>) -> Self {
        match res {
            Ok(Page { title, content }) => Self::Success { title, content },
            Err(e) => Self::Failure {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ResultWire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ExtractionResult> for ResultWire {
    fn from(r: ExtractionResult) -> Self {
        match r {
            ExtractionResult::Success { title, content } => Self {
                success: true,
                title: Some(title),
                content: Some(content),
                error: None,
            },
            ExtractionResult::Failure { error } => Self {
                success: false,
                title: None,
                content: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<ResultWire> for ExtractionResult {
    type Error = String;

    fn try_from(w: ResultWire) -> std::result::Result<Self, Self::Error> {
        if w.success {
            match (w.title, w.content) {
                (Some(title), Some(content)) => Ok(Self::Success { title, content }),
                _ => Err("successful result requires `title` and `content`".into()),
            }
        } else {
            Ok(Self::Failure {
                error: w.error.unwrap_or_default(),
            })
        }
    }
}

/// Error types surfaced by a single extraction call.
///
/// Every variant is terminal: the extractor never retries, and the
/// `Display` text is what callers show to the user.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    /// The URL did not parse or was not http(s).
    #[error("Invalid URL format. Please enter a full URL including https://")]
    InvalidUrl,

    /// Host allowlist rejected a well-formed URL.
    #[error("Invalid URL. Hostname must be a {suffix} domain.")]
    HostNotAllowed { suffix: String },

    /// Wiki URL without a page name after the page marker.
    #[error("Could not determine page name from URL. Make sure it contains \"{marker}\".")]
    MissingPageName { marker: String },

    /// Upstream answered with a non-2xx status.
    #[error("Failed to fetch {what}. Server responded with status: {status}")]
    Fetch { what: &'static str, status: u16 },

    /// Upstream API returned a structured error payload.
    #[error("API Error: {0}. Please check the page URL.")]
    Api(String),

    /// Otherwise successful API response without `parse.text`.
    #[error("Could not find content in the API response.")]
    MissingContent,

    /// Raw HTML lacked a recognizable content boundary.
    #[error("Could not locate the page content in the returned HTML.")]
    UnsupportedStructure,

    /// Anything else (network failure, malformed JSON, ...).
    #[error("An unexpected error occurred: {0}")]
    Unknown(String),
}

/// Convenient alias for results that use [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;
