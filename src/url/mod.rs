//! URL handling module for Pagescope
//!
//! This module provides submission validation, host extraction, href
//! resolution and internal/external link classification.

mod domain;
mod resolve;
mod validate;

use ::url::Url;

// Re-export main functions
pub use domain::same_host;
pub use resolve::{is_http_link, probe_target, resolve_href};
pub use validate::validate_submission;

/// Whether a link points at the page's own host or somewhere else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Same host as the submitted URL
    Internal,
    /// Any other host
    External,
}

impl LinkKind {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Classifies a resolved link against the base URL of the page it was found on
///
/// Only the host takes part in the comparison: scheme, port, path and query
/// are ignored, and hosts compare case-insensitively. Classification is a
/// pure function of its inputs.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pagescope::url::{classify_link, LinkKind};
///
/// let base = Url::parse("http://example.com/").unwrap();
/// let link = Url::parse("https://EXAMPLE.com/about").unwrap();
/// assert_eq!(classify_link(&link, &base), LinkKind::Internal);
///
/// let link = Url::parse("https://other.org/").unwrap();
/// assert_eq!(classify_link(&link, &base), LinkKind::External);
/// ```
pub fn classify_link(link: &Url, base: &Url) -> LinkKind {
    if same_host(link, base) {
        LinkKind::Internal
    } else {
        LinkKind::External
    }
}
