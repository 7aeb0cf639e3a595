//! Post-processing shared by every strategy: lazy images, then links.
//!
//! Both passes are text rewrites over the fragment; markup outside the
//! matched tags and attributes is left byte-for-byte intact. Running
//! [`post_process`] on its own output changes nothing.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("img tag regex"));

static DATA_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+data-src="([^"]+)""#).expect("data-src regex"));

static SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+src="[^"]*""#).expect("src regex"));

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s+class="([^"]*)""#).expect("class regex"));

static IMAGE_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+data-image-(?:name|key)="[^"]*""#).expect("image meta regex")
});

// No look-ahead in `regex`; the character after the slash is captured and
// re-emitted so protocol-relative `//host` values never match.
static ROOT_RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(href|src)="/([^/]|$)"#).expect("root-relative regex")
});

const LAZY_CLASS: &str = "lazyload";

/// Lazy-image normalization followed by link absolutization against `origin`.
pub fn post_process(html: &str, origin: &str) -> String {
    let images = normalize_lazy_images(html);
    absolutize_links(&images, origin).into_owned()
}

/// Rewrites every `<img>` carrying `data-src` so it loads eagerly.
pub fn normalize_lazy_images(html: &str) -> Cow<'_, str> {
    IMG_TAG_RE.replace_all(html, |caps: &Captures| rewrite_img_tag(&caps[0]))
}

fn rewrite_img_tag(tag: &str) -> String {
    let Some(data_src) = DATA_SRC_RE.captures(tag).map(|c| c[1].to_string()) else {
        return tag.to_string();
    };

    // Drop the placeholder `src` first so the promoted one is the only one.
    let tag = SRC_RE.replace_all(tag, "");
    let tag = DATA_SRC_RE.replace(&tag, |_: &Captures| format!(r#" src="{data_src}""#));
    let tag = CLASS_RE.replace(&tag, |caps: &Captures| {
        let kept: Vec<&str> = caps[1]
            .split_whitespace()
            .filter(|token| !token.eq_ignore_ascii_case(LAZY_CLASS))
            .collect();
        if kept.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, kept.join(" "))
        }
    });
    IMAGE_META_RE.replace_all(&tag, "").into_owned()
}

/// Prefixes root-relative `href`/`src` values with `origin`.
pub fn absolutize_links<'a>(html: &'a str, origin: &str) -> Cow<'a, str> {
    let origin = origin.trim_end_matches('/');
    ROOT_RELATIVE_RE.replace_all(html, |caps: &Captures| {
        format!(r#"{}="{}/{}"#, &caps[1], origin, &caps[2])
    })
}
