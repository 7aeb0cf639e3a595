//! Raw wiki HTML: cut the rendered article out of a full skin page.
//!
//! The article starts at the element carrying [`CONTENT_WRAPPER_MARKER`] and
//! ends before the renderer's limit-report comment. Pages without that
//! comment fall back to a balanced `<div>` scan, which is only as good as the
//! page's own nesting.

use url::Url;
use wacker_common::{ExtractError, Page, Result};

use crate::extract::{strip_scripts_and_styles, title_or_host};

pub const CONTENT_WRAPPER_MARKER: &str = r#"class="mw-parser-output""#;
pub const LIMIT_REPORT_MARKER: &str = "NewPP limit report";

const DIV_OPEN: &str = "<div";
const DIV_CLOSE: &str = "</div>";
const COMMENT_OPEN: &str = "<!--";

/// Title plus the wrapped article, scripts and styles removed.
pub fn extract_wrapped(html: &str, url: &Url) -> Result<Page> {
    let content = cut_wrapped_content(html)?;
    Ok(Page {
        title: title_or_host(html, url),
        content: strip_scripts_and_styles(content),
    })
}

/// The slice from the wrapper element's `<` to the end of the article.
pub fn cut_wrapped_content(html: &str) -> Result<&str> {
    let marker_at = html
        .find(CONTENT_WRAPPER_MARKER)
        .ok_or(ExtractError::UnsupportedStructure)?;
    let start = html[..marker_at].rfind('<').unwrap_or(marker_at);
    let after = marker_at + CONTENT_WRAPPER_MARKER.len();

    let end = match html[after..].find(LIMIT_REPORT_MARKER) {
        Some(rel) => {
            let limit = after + rel;
            let end = html[after..limit]
                .rfind(COMMENT_OPEN)
                .map_or(limit, |c| after + c);
            tracing::debug!(target: "web.extract", end, "wrapper.limit_report");
            end
        }
        None => match balanced_div_end(html, after) {
            Some(end) => {
                tracing::debug!(target: "web.extract", end, "wrapper.balanced");
                end
            }
            None => {
                tracing::debug!(
                    target: "web.extract",
                    doc_len = html.len(),
                    "wrapper.unbalanced_to_eof"
                );
                html.len()
            }
        },
    };

    Ok(&html[start..end])
}

/// Offset just past the `</div>` that closes the element open at `from`.
///
/// Depth starts at 1 (the wrapper itself). The scan only ever looks at the
/// next `<div` and the next `</div>`: whichever comes first moves the cursor
/// and the depth. `None` when input runs out before depth reaches zero.
pub fn balanced_div_end(html: &str, from: usize) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let mut depth: usize = 1;
    let mut cursor = from;

    loop {
        let next_close = cursor + lower[cursor..].find(DIV_CLOSE)?;
        let next_open = lower[cursor..].find(DIV_OPEN).map(|rel| cursor + rel);

        match next_open {
            Some(open) if open < next_close => {
                depth += 1;
                cursor = open + DIV_OPEN.len();
            }
            _ => {
                depth -= 1;
                cursor = next_close + DIV_CLOSE.len();
                if depth == 0 {
                    return Some(cursor);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_wrapper_is_unsupported() {
        let err = cut_wrapped_content("<html><body><div>plain</div></body></html>").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedStructure));
    }

    #[test]
    fn balanced_scan_stops_at_matching_close() {
        let html = concat!(
            r#"<body><div class="mw-parser-output">"#,
            "<div><div>deep</div></div>",
            "</div>",
            "<div id=\"footer\">footer</div></body>"
        );
        let content = cut_wrapped_content(html).unwrap();
        assert_eq!(
            content,
            r#"<div class="mw-parser-output"><div><div>deep</div></div></div>"#
        );
    }

    #[test]
    fn three_opens_three_closes() {
        // The wrapper's own <div plus two nested ones, closed three times.
        let html = r#"<div class="mw-parser-output"><div><DIV>x</div></Div></div>tail</div>"#;
        let at = html.find(CONTENT_WRAPPER_MARKER).unwrap() + CONTENT_WRAPPER_MARKER.len();
        let end = balanced_div_end(html, at).unwrap();
        assert_eq!(&html[..end], r#"<div class="mw-parser-output"><div><DIV>x</div></Div></div>"#);
        assert!(html[..end].ends_with("</div>"));
    }

    #[test]
    fn unbalanced_content_runs_to_end_of_input() {
        let html = r#"<div class="mw-parser-output"><div><p>never closed"#;
        let at = html.find(CONTENT_WRAPPER_MARKER).unwrap() + CONTENT_WRAPPER_MARKER.len();
        assert_eq!(balanced_div_end(html, at), None);
        assert_eq!(cut_wrapped_content(html).unwrap(), html);
    }

    #[test]
    fn limit_report_comment_ends_content() {
        let html = concat!(
            r#"<div id="content"><div class="mw-parser-output"><p>Body</p>"#,
            "\n<!-- \nNewPP limit report\nCPU time usage: 0.1 seconds\n-->\n",
            "</div></div>"
        );
        let content = cut_wrapped_content(html).unwrap();
        assert_eq!(content, "<div class=\"mw-parser-output\"><p>Body</p>\n");
    }

    #[test]
    fn wrapped_page_strips_scripts_and_uses_title() {
        let html = concat!(
            "<html><head><title>Crops | Grow a Garden Wiki | Fandom</title></head><body>",
            r#"<div class="mw-parser-output"><p>Carrot</p><script>ads()</script></div>"#,
            "<footer>f</footer></body></html>"
        );
        let url = Url::parse("https://growagarden.fandom.com/wiki/Crops").unwrap();
        let page = extract_wrapped(html, &url).unwrap();
        assert_eq!(page.title, "Crops | Grow a Garden Wiki | Fandom");
        assert_eq!(page.content, r#"<div class="mw-parser-output"><p>Carrot</p></div>"#);
    }
}
