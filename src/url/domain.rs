use url::Url;

/// Returns true if both URLs carry the same host, compared case-insensitively
///
/// URLs without a host never match anything, including each other.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
