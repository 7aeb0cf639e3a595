//! Lightweight HTML extraction over raw text.
//!
//! No DOM is built: the title and the content region are located with
//! case-insensitive, non-greedy patterns, so malformed markup degrades to a
//! larger region rather than an error.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;
use wacker_common::Page;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("title regex"));

// Priority order: first match wins.
static REGION_RES: LazyLock<[(&'static str, Regex); 3]> = LazyLock::new(|| {
    ["main", "article", "body"].map(|tag| {
        let re = Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}\s*>"))
            .expect("region regex");
        (tag, re)
    })
});

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script regex"));

static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("style regex"));

// An opening tag whose close never arrives swallows the rest of the input.
static UNTERMINATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*\z").expect("unterminated block regex")
});

/// Title plus the main region of an arbitrary page, scripts and styles removed.
pub fn extract_generic(html: &str, url: &Url) -> Page {
    let title = title_or_host(html, url);
    let (container, region) = select_region(html);
    tracing::debug!(
        target: "web.extract",
        container,
        region_len = region.len(),
        doc_len = html.len(),
        "generic.region"
    );
    Page {
        title,
        content: strip_scripts_and_styles(region),
    }
}

/// Trimmed text of the first `<title>` element.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .map(|caps| decode_entities(caps[1].trim()))
        .filter(|t| !t.is_empty())
}

// `&amp;` goes last so `&amp;lt;` stays the literal text `&lt;`.
fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

pub fn title_or_host(html: &str, url: &Url) -> String {
    extract_title(html).unwrap_or_else(|| url.host_str().unwrap_or_default().to_string())
}

/// Inner HTML of the first `<main>`, `<article>` or `<body>`, else the whole
/// document. Returns the name of the container that matched.
pub fn select_region(html: &str) -> (&'static str, &str) {
    for (tag, re) in REGION_RES.iter() {
        if let Some(inner) = re.captures(html).and_then(|caps| caps.get(1)) {
            return (*tag, inner.as_str());
        }
    }
    ("document", html)
}

/// Removes `<script>`/`<style>` blocks until none are left.
///
/// Removal repeats because cutting an inner block can splice an outer tag
/// back together (`<scr<script></script>ipt>`).
pub fn strip_scripts_and_styles(html: &str) -> String {
    let mut out = html.to_string();
    loop {
        let without_scripts = SCRIPT_RE.replace_all(&out, "");
        let next = STYLE_RE.replace_all(&without_scripts, "").into_owned();
        if next == out {
            break;
        }
        out = next;
    }
    if let Some(m) = UNTERMINATED_RE.find(&out) {
        out.truncate(m.start());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://blog.example.org/posts/1").unwrap()
    }

    #[test]
    fn title_is_case_insensitive_and_trimmed() {
        let html = "<HEAD><Title lang=\"en\">\n  Hello World \n</TITLE></HEAD>";
        assert_eq!(extract_title(html).as_deref(), Some("Hello World"));
    }

    #[test]
    fn missing_or_blank_title_falls_back_to_host() {
        assert_eq!(title_or_host("<p>no head</p>", &url()), "blog.example.org");
        assert_eq!(title_or_host("<title> </title>", &url()), "blog.example.org");
    }

    #[test]
    fn main_beats_article_and_body() {
        let html = "<body><article>a</article><MAIN id=\"m\">m</main></body>";
        assert_eq!(select_region(html), ("main", "m"));
    }

    #[test]
    fn article_beats_body() {
        let html = "<body class=\"x\"><nav>n</nav><article>first</article><article>second</article></body>";
        assert_eq!(select_region(html), ("article", "first"));
    }

    #[test]
    fn body_then_whole_document() {
        assert_eq!(select_region("<html><body>b</body></html>"), ("body", "b"));
        assert_eq!(select_region("<p>bare</p>"), ("document", "<p>bare</p>"));
    }

    #[test]
    fn mainframe_is_not_main() {
        let html = "<mainframe>x</mainframe><body>b</body>";
        assert_eq!(select_region(html), ("body", "b"));
    }

    #[test]
    fn scripts_and_styles_are_stripped_non_greedily() {
        let html = concat!(
            "<p>keep 1</p><SCRIPT type=\"text/javascript\">var a = '<p>';</script>",
            "<p>keep 2</p><style>p { color: red }</STYLE>",
            "<script>one()</script><p>keep 3</p><script src=\"x.js\"></script>"
        );
        assert_eq!(
            strip_scripts_and_styles(html),
            "<p>keep 1</p><p>keep 2</p><p>keep 3</p>"
        );
    }

    #[test]
    fn nested_fragments_cannot_reassemble_a_script() {
        let html = "<p>a</p><scr<script>x</script>ipt>alert(1)</script>";
        assert_eq!(strip_scripts_and_styles(html), "<p>a</p>");
        let html = "<p>b</p><sty<style>x</style>le>p{}</style>";
        assert_eq!(strip_scripts_and_styles(html), "<p>b</p>");
    }

    #[test]
    fn unterminated_script_tail_is_dropped() {
        assert_eq!(
            strip_scripts_and_styles("<p>keep</p><script>var s = '"),
            "<p>keep</p>"
        );
        assert_eq!(strip_scripts_and_styles("<p>keep</p><STYLE media=x>p{"), "<p>keep</p>");
    }

    #[test]
    fn close_tag_inside_script_string_leaves_no_script() {
        let html = "<html><body><main><p>lead</p><script>var s = '</main>'; evil();</script><p>rest</p></main></body></html>";
        let page = extract_generic(html, &url());
        assert!(!page.content.to_ascii_lowercase().contains("<script"));
        assert_eq!(page.content, "<p>lead</p>");
    }

    #[test]
    fn title_entities_are_decoded() {
        let html = "<title>Crops &amp; Seeds &lt;v2&gt; &quot;new&quot; Farmer&#39;s &amp;lt;</title>";
        assert_eq!(
            extract_title(html).as_deref(),
            Some("Crops & Seeds <v2> \"new\" Farmer's &lt;")
        );
        assert_eq!(extract_title("<title>&nbsp;</title>"), None);
    }

    #[test]
    fn generic_page_combines_title_region_and_stripping() {
        let html = r#"<html><head><title>Post</title><style>body{}</style></head>
<body><header>nav</header><main><h1>Post</h1><script>track()</script><p>Text</p></main></body></html>"#;
        let page = extract_generic(html, &url());
        assert_eq!(page.title, "Post");
        assert_eq!(page.content, "<h1>Post</h1><p>Text</p>");
    }
}
