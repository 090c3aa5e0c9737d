//! Conditional request handling
//!
//! `Last-Modified` / `If-Modified-Since` validation. Only the validator is
//! emitted; no freshness headers (`Cache-Control`, `Expires`) are ever set.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Format a modification time as an HTTP date
pub fn last_modified(modified: SystemTime) -> String {
    httpdate::fmt_http_date(modified)
}

/// True when the client's copy is at least as new as the file.
///
/// HTTP dates carry whole seconds, so the file time is truncated before
/// comparing. Unparseable dates never match.
pub fn is_not_modified(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(|v| httpdate::parse_http_date(v).ok()) else {
        return false;
    };
    truncate_to_secs(modified) <= since
}

fn truncate_to_secs(t: SystemTime) -> SystemTime {
    t.duration_since(UNIX_EPOCH)
        .map_or(t, |d| UNIX_EPOCH + Duration::from_secs(d.as_secs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_last_modified_format() {
        assert_eq!(last_modified(at(0)), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn test_not_modified_same_second() {
        let modified = at(1_700_000_000) + Duration::from_millis(750);
        let header = last_modified(modified);
        assert!(is_not_modified(Some(&header), modified));
    }

    #[test]
    fn test_modified_after_client_copy() {
        let header = last_modified(at(1_700_000_000));
        assert!(!is_not_modified(Some(&header), at(1_700_000_060)));
    }

    #[test]
    fn test_missing_or_garbage_header() {
        assert!(!is_not_modified(None, at(10)));
        assert!(!is_not_modified(Some("yesterday"), at(10)));
    }
}
