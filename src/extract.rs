use crate::error::Result;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use url::Url;

/// Attributes that may hold an image's real source, eager first, then the
/// usual lazy-loading conventions.
pub const SOURCE_ATTRS: &[&str] = &[
    "src",
    "data-src",
    "data-original",
    "data-lazy",
    "data-lazy-src",
    "data-fullres",
    "data-hires",
];

/// Attributes holding responsive `URL [descriptor]` lists
pub const SRCSET_ATTRS: &[&str] = &["srcset", "data-srcset"];

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid img selector"));

// <source> inside <picture> (and <video>/<audio>, which is harmless)
static SOURCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("source").expect("valid source selector"));

// Scripting-enabled parsing leaves <noscript> content as raw text
static NOSCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("noscript").expect("valid noscript selector"));

static STYLED_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[style]").expect("valid style selector"));

static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*['"]?(.*?)['"]?\s*\)"#).expect("valid css url regex")
});

/// Parses `html` and extracts every image reference, resolved against `base_url`.
pub fn extract_from_html(html: &str, base_url: &str) -> Result<BTreeSet<String>> {
    let base = Url::parse(base_url)?;
    let document = Html::parse_document(html);
    Ok(extract(&document, &base))
}

/// Collects absolute image URLs from a rendered document.
///
/// Four sources are combined: `<img>` source attributes (including lazy-load
/// ones), `srcset` lists on `<img>` and `<source>`, `<source>` source
/// attributes, and `url(...)` tokens in inline `background` styles. Markup
/// inside `<noscript>` is parsed and scanned the same way. `data:` URIs are
/// dropped. The result is a set, so the same URL found by several strategies
/// appears once.
pub fn extract(document: &Html, base_url: &Url) -> BTreeSet<String> {
    let mut references = References::new(base_url);
    scan_document(document, &mut references);

    for noscript in document.select(&NOSCRIPT_SELECTOR) {
        let markup = noscript.text().collect::<String>();
        if markup.trim().is_empty() {
            continue;
        }
        scan_document(&Html::parse_fragment(&markup), &mut references);
    }

    ::log::debug!("Extracted {} image references", references.urls.len());
    references.urls
}

fn scan_document(document: &Html, references: &mut References<'_>) {
    for img in document.select(&IMG_SELECTOR) {
        scan_source_attrs(img, references);
        scan_srcset_attrs(img, references);
    }

    for source in document.select(&SOURCE_SELECTOR) {
        scan_source_attrs(source, references);
        scan_srcset_attrs(source, references);
    }

    for element in document.select(&STYLED_SELECTOR) {
        if let Some(style) = element.value().attr("style") {
            scan_background_style(style, references);
        }
    }
}

fn scan_source_attrs(element: ElementRef<'_>, references: &mut References<'_>) {
    for attr in SOURCE_ATTRS {
        if let Some(value) = element.value().attr(attr) {
            references.insert(value);
        }
    }
}

fn scan_srcset_attrs(element: ElementRef<'_>, references: &mut References<'_>) {
    for attr in SRCSET_ATTRS {
        if let Some(value) = element.value().attr(attr) {
            for candidate in parse_srcset(value) {
                references.insert(candidate);
            }
        }
    }
}

fn scan_background_style(style: &str, references: &mut References<'_>) {
    // Covers both `background-image` and the `background` shorthand
    if !style.to_ascii_lowercase().contains("background") {
        return;
    }
    for candidate in css_urls(style) {
        references.insert(candidate);
    }
}

/// Splits a `srcset` value into its URL tokens, discarding descriptors.
///
/// `"a.jpg 1x, b.jpg 2x"` yields `["a.jpg", "b.jpg"]`. A URL runs until
/// whitespace, so commas inside a URL (CDN transforms) are kept; a token with
/// commas also contributes each comma-separated piece, so `"a.jpg,b.jpg 2x"`
/// still yields `a.jpg` and `b.jpg`. Data URIs are never split.
pub fn parse_srcset(value: &str) -> Vec<&str> {
    let mut urls = Vec::new();
    let mut rest = value;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        let url = token.trim_end_matches(',');
        if !url.is_empty() {
            urls.push(url);
            if url.contains(',') && !is_inline_data(url) {
                urls.extend(url.split(',').map(str::trim).filter(|p| !p.is_empty()));
            }
        }

        // A trailing comma closes the candidate; otherwise skip its descriptor
        rest = if token.ends_with(',') {
            tail
        } else {
            tail.find(',').map_or("", |i| &tail[i + 1..])
        };
    }

    urls
}

/// Returns the arguments of every `url(...)` in a CSS declaration, unquoted.
pub fn css_urls(style: &str) -> Vec<&str> {
    CSS_URL_RE
        .captures_iter(style)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Returns true for inline `data:` URIs, which are never downloaded
pub fn is_inline_data(candidate: &str) -> bool {
    candidate
        .trim_start()
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Accumulates resolved, filtered candidates
struct References<'a> {
    base: &'a Url,
    urls: BTreeSet<String>,
}

impl<'a> References<'a> {
    fn new(base: &'a Url) -> Self {
        Self {
            base,
            urls: BTreeSet::new(),
        }
    }

    fn insert(&mut self, candidate: &str) {
        let candidate = candidate.trim();
        if candidate.is_empty() || is_inline_data(candidate) {
            return;
        }

        match self.base.join(candidate) {
            Ok(resolved) if resolved.scheme() == "data" => {}
            Ok(resolved) => {
                self.urls.insert(resolved.to_string());
            }
            Err(e) => {
                ::log::trace!("Skipping unresolvable candidate {:?}: {}", candidate, e);
            }
        }
    }
}
