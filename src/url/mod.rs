//! URL handling module for Shutter-Sweep
//!
//! This module provides URL normalization (the Frontier's dedup key), domain
//! extraction, wildcard matching, and allowed-domain checks.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::matches_wildcard;
pub use normalize::normalize_url;

use url::Url;

/// Checks whether a URL's host falls inside the allowed domain list
///
/// Each entry accepts its bare domain and every subdomain below it, so
/// `"example.com"` admits `"cdn.example.com"`. An empty list admits everything.
/// URLs without a host are never allowed.
///
/// # Examples
///
/// ```
/// use shutter_sweep::url::is_allowed_domain;
/// use url::Url;
///
/// let allowed = vec!["example.com".to_string()];
/// let url = Url::parse("https://images.example.com/a.jpg").unwrap();
/// assert!(is_allowed_domain(&url, &allowed));
///
/// let url = Url::parse("https://example.org/").unwrap();
/// assert!(!is_allowed_domain(&url, &allowed));
/// ```
pub fn is_allowed_domain(url: &Url, allowed: &[String]) -> bool {
    let Some(domain) = extract_domain(url) else {
        return false;
    };

    if allowed.is_empty() {
        return true;
    }

    allowed.iter().any(|pattern| {
        let base = pattern.strip_prefix("*.").unwrap_or(pattern);
        matches_wildcard(&format!("*.{}", base.to_lowercase()), &domain)
    })
}
