use crate::{UrlError, UrlResult};
use url::Url;

/// Validates a URL submitted for analysis
///
/// The submitted string is trimmed and must parse as an absolute HTTP or
/// HTTPS URL with a host. The trimmed string is returned unchanged; it is
/// the identity under which the record is stored, so two submissions are the
/// same record only when their trimmed text matches exactly.
///
/// # Examples
///
/// ```
/// use pagescope::url::validate_submission;
///
/// assert_eq!(
///     validate_submission("  http://example.com  ").unwrap(),
///     "http://example.com"
/// );
/// assert!(validate_submission("ftp://example.com").is_err());
/// ```
pub fn validate_submission(raw: &str) -> UrlResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(UrlError::MissingHost),
    }
}
