//! Security response headers
//!
//! One process-wide table, applied to every response by the
//! security-header stage.

use hyper::header::{HeaderName, HeaderValue};

/// Scripts, styles, images, fonts and fetches are limited to this origin plus
/// the font host, the sprite host and the data API the bundled app talks to.
pub const CONTENT_SECURITY_POLICY: &str = concat!(
    "default-src 'self'; ",
    "script-src 'self' 'unsafe-inline' 'unsafe-eval'; ",
    "style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; ",
    "img-src 'self' data: https://raw.githubusercontent.com; ",
    "font-src 'self' https://fonts.gstatic.com; ",
    "connect-src 'self' https://pokeapi.co;",
);

pub static SECURITY_HEADERS: [(HeaderName, HeaderValue); 7] = [
    (
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    ),
    (
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    ),
    (
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    ),
    (
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("1; mode=block"),
    ),
    (
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    ),
    (
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    ),
    (
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_has_unique_names() {
        let names: HashSet<_> = SECURITY_HEADERS.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names.len(), SECURITY_HEADERS.len());
    }

    #[test]
    fn test_csp_allow_list() {
        assert!(CONTENT_SECURITY_POLICY.starts_with("default-src 'self';"));
        assert!(CONTENT_SECURITY_POLICY.contains("font-src 'self' https://fonts.gstatic.com;"));
        assert!(CONTENT_SECURITY_POLICY.contains("img-src 'self' data: https://raw.githubusercontent.com;"));
        assert!(CONTENT_SECURITY_POLICY.ends_with("connect-src 'self' https://pokeapi.co;"));
    }
}
