//! Page analyzer
//!
//! This module turns a fetched HTML body into the facts stored on a record:
//! - HTML version (from the doctype)
//! - Page title
//! - Heading counts per level
//! - Links, classified internal/external against the page's URL
//! - Login form presence
//!
//! Parsing is html5ever's error-recovering parse, so malformed markup never
//! aborts an analysis; missing pieces come back empty or zero.

use crate::storage::HeadingCounts;
use crate::url::{classify_link, is_http_link, probe_target, resolve_href, LinkKind};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Label used when no doctype is present or it is not recognized
pub const UNKNOWN_HTML_VERSION: &str = "Unknown";

/// Public identifiers of legacy doctypes, lowercased, and their labels
const KNOWN_DOCTYPES: &[(&str, &str)] = &[
    ("-//w3c//dtd html 4.01//en", "HTML 4.01 Strict"),
    ("-//w3c//dtd html 4.01 transitional//en", "HTML 4.01 Transitional"),
    ("-//w3c//dtd html 4.01 frameset//en", "HTML 4.01 Frameset"),
    ("-//w3c//dtd xhtml 1.0 strict//en", "XHTML 1.0 Strict"),
    ("-//w3c//dtd xhtml 1.0 transitional//en", "XHTML 1.0 Transitional"),
    ("-//w3c//dtd xhtml 1.0 frameset//en", "XHTML 1.0 Frameset"),
    ("-//w3c//dtd xhtml 1.1//en", "XHTML 1.1"),
    ("-//w3c//dtd html 3.2 final//en", "HTML 3.2"),
    ("-//w3c//dtd html 3.2//en", "HTML 3.2"),
    ("-//ietf//dtd html 2.0//en", "HTML 2.0"),
    ("-//ietf//dtd html//en", "HTML 2.0"),
];

/// A link found on the page, already resolved against the page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub url: Url,
    pub kind: LinkKind,
}

/// Everything the analyzer extracts from one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageAnalysis {
    pub html_version: String,
    pub page_title: String,
    pub heading_counts: HeadingCounts,
    /// Links in document order, duplicates included
    pub links: Vec<ExtractedLink>,
    pub has_login_form: bool,
}

impl PageAnalysis {
    pub fn internal_links(&self) -> u32 {
        self.links.iter().filter(|l| l.kind.is_internal()).count() as u32
    }

    pub fn external_links(&self) -> u32 {
        self.links.iter().filter(|l| !l.kind.is_internal()).count() as u32
    }

    /// Distinct HTTP(S) URLs to check, fragment stripped, in first-occurrence order
    pub fn probe_targets(&self) -> Vec<Url> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .filter(|link| is_http_link(&link.url))
            .map(|link| probe_target(&link.url))
            .filter(|target| seen.insert(target.as_str().to_string()))
            .collect()
    }
}

/// Analyzes an HTML document
///
/// # Arguments
///
/// * `html` - The HTML content to analyze
/// * `base_url` - The page's URL; relative hrefs resolve against it and its
///   host decides whether a link is internal
///
/// # Example
///
/// ```
/// use pagescope::crawler::analyze;
/// use url::Url;
///
/// let html = r#"<!DOCTYPE html><title>Home</title><h1>A</h1><a href="/about">About</a>"#;
/// let base_url = Url::parse("http://example.com/").unwrap();
/// let analysis = analyze(html, &base_url);
/// assert_eq!(analysis.page_title, "Home");
/// assert_eq!(analysis.html_version, "HTML 5");
/// assert_eq!(analysis.internal_links(), 1);
/// ```
pub fn analyze(html: &str, base_url: &Url) -> PageAnalysis {
    let document = Html::parse_document(html);

    PageAnalysis {
        html_version: detect_html_version(&document),
        page_title: extract_title(&document),
        heading_counts: count_headings(&document),
        links: extract_links(&document, base_url),
        has_login_form: detect_login_form(&document),
    }
}

/// Reads the doctype node and maps it to a version label
fn detect_html_version(document: &Html) -> String {
    document
        .tree
        .root()
        .children()
        .find_map(|node| node.value().as_doctype())
        .map(|doctype| html_version_label(doctype.name(), doctype.public_id(), doctype.system_id()))
        .unwrap_or(UNKNOWN_HTML_VERSION)
        .to_string()
}

/// Maps doctype name and identifiers to a version label
///
/// `<!DOCTYPE html>` (no public identifier, optionally the
/// `about:legacy-compat` system identifier) is HTML 5; legacy doctypes are
/// matched case-insensitively on their public identifier.
pub fn html_version_label(name: &str, public_id: &str, system_id: &str) -> &'static str {
    if !name.eq_ignore_ascii_case("html") {
        return UNKNOWN_HTML_VERSION;
    }

    let public_id = public_id.trim().to_ascii_lowercase();
    if public_id.is_empty() {
        let system_id = system_id.trim();
        return if system_id.is_empty() || system_id.eq_ignore_ascii_case("about:legacy-compat") {
            "HTML 5"
        } else {
            UNKNOWN_HTML_VERSION
        };
    }

    KNOWN_DOCTYPES
        .iter()
        .find(|(id, _)| *id == public_id)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_HTML_VERSION)
}

/// Extracts the text of the first `<title>`, trimmed; empty if there is none
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Counts every `<h1>`..`<h6>` regardless of nesting
fn count_headings(document: &Html) -> HeadingCounts {
    let mut counts = HeadingCounts::default();

    if let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") {
        for element in document.select(&selector) {
            if let Some(level) = element
                .value()
                .name()
                .strip_prefix('h')
                .and_then(|d| d.parse::<u8>().ok())
            {
                counts.increment(level);
            }
        }
    }

    counts
}

/// Extracts and classifies all `<a href>` links
fn extract_links(document: &Html, base_url: &Url) -> Vec<ExtractedLink> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(url) = resolve_href(href, base_url) {
                let kind = classify_link(&url, base_url);
                links.push(ExtractedLink { url, kind });
            }
        }
    }

    links
}

/// True if any `<form>` contains an `<input type="password">`
fn detect_login_form(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("form input[type]") else {
        return false;
    };

    document.select(&selector).any(|input| {
        input
            .value()
            .attr("type")
            .map(|t| t.trim().eq_ignore_ascii_case("password"))
            .unwrap_or(false)
    })
}
