use url::Url;

/// Resolves an `href` attribute value against the page's base URL
///
/// Every non-empty, non-fragment-only href that parses is a link, whatever
/// its scheme; `mailto:` or `javascript:` links have no host and so classify
/// as external. Returns None for:
/// - empty or whitespace-only hrefs
/// - fragment-only hrefs (`#section`)
/// - hrefs that do not parse against the base URL
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    base_url.join(href).ok()
}

/// True for links a reachability check can be sent to
pub fn is_http_link(link: &Url) -> bool {
    matches!(link.scheme(), "http" | "https")
}

/// The URL actually requested when probing a link: the fragment never
/// reaches the server, so it is dropped
pub fn probe_target(link: &Url) -> Url {
    let mut target = link.clone();
    target.set_fragment(None);
    target
}
