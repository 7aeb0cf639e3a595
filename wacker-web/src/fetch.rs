use url::Url;
use wacker_common::{ExtractError, Result};
use wacker_http::{HttpClient, HttpError, RequestOpts};

/// Upstream statuses become `Fetch`; transport and decode failures are `Unknown`.
pub fn map_http_error(err: HttpError, what: &'static str) -> ExtractError {
    match err.status() {
        Some(status) => ExtractError::Fetch {
            what,
            status: status.as_u16(),
        },
        None => ExtractError::Unknown(err.to_string()),
    }
}

/// Raw HTML of `url`, fetched fresh.
pub async fn fetch_html(http: &HttpClient, url: &Url) -> Result<String> {
    http.get_text(
        url.as_str(),
        RequestOpts {
            allow_absolute: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| map_http_error(e, "page"))
}
