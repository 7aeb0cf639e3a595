//! MediaWiki `action=parse` client.
//!
//! The API hands back the rendered page body directly, so no scraping is
//! needed. Responses are requested as `formatversion=2` (plain string
//! `text`); the legacy `{"*": ...}` shape is still accepted.

use serde::Deserialize;
use std::borrow::Cow;
use wacker_common::{ExtractError, Page, Result};
use wacker_http::{HttpClient, RequestOpts};

use crate::fetch::map_http_error;

pub const API_PATH: &str = "api.php";

#[derive(Debug, Deserialize)]
pub struct ParseEnvelope {
    #[serde(default)]
    pub parse: Option<ParsedPage>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ParsedPage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<ParseText>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ParseText {
    Plain(String),
    Legacy {
        #[serde(rename = "*")]
        body: String,
    },
}

impl ParseText {
    fn into_string(self) -> String {
        match self {
            Self::Plain(s) => s,
            Self::Legacy { body } => body,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

/// Query pairs for rendering `page` as JSON.
pub fn parse_query(page: &str) -> Vec<(&'static str, Cow<'_, str>)> {
    vec![
        ("action", Cow::Borrowed("parse")),
        ("page", Cow::Borrowed(page)),
        ("format", Cow::Borrowed("json")),
        ("prop", Cow::Borrowed("text")),
        ("formatversion", Cow::Borrowed("2")),
    ]
}

/// Fetches and renders `page` through `<base>/api.php`.
///
/// `http` must be anchored at the wiki origin.
pub async fn fetch_parsed_page(http: &HttpClient, page: &str) -> Result<Page> {
    let envelope: ParseEnvelope = http
        .get_json(
            API_PATH,
            RequestOpts {
                query: Some(parse_query(page)),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| map_http_error(e, "from API"))?;

    let page_out = page_from_envelope(envelope, page)?;
    tracing::debug!(
        target: "web.extract",
        page,
        title = %page_out.title,
        content_len = page_out.content.len(),
        "mediawiki.parsed"
    );
    Ok(page_out)
}

/// Applies the error/missing-content rules to a decoded response.
pub fn page_from_envelope(envelope: ParseEnvelope, page: &str) -> Result<Page> {
    if let Some(err) = envelope.error {
        let detail = err
            .info
            .or(err.code)
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(ExtractError::Api(detail));
    }

    let parsed = envelope.parse.ok_or(ExtractError::MissingContent)?;
    let content = parsed
        .text
        .map(ParseText::into_string)
        .filter(|t| !t.is_empty())
        .ok_or(ExtractError::MissingContent)?;
    let title = parsed
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| page.replace('_', " "));

    Ok(Page { title, content })
}
