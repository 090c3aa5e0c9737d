//! Request path normalisation
//!
//! Turns a request path into a path relative to the asset root. `..` is
//! resolved lexically and clamped at the root, so `/../../etc/passwd` becomes
//! `etc/passwd` under the root rather than escaping it.

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// Map a request path onto the asset root.
///
/// `None` means the path cannot name a file (bad encoding, NUL, backslash,
/// drive prefixes); callers treat that like a missing file.
pub fn normalize_request_path(raw: &str, index_file: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s if s.contains(['\0', '\\']) => return None,
            s => {
                let mut components = Path::new(s).components();
                if !matches!(
                    (components.next(), components.next()),
                    (Some(Component::Normal(_)), None)
                ) {
                    return None;
                }
                segments.push(s);
            }
        }
    }

    if segments.is_empty() {
        return Some(PathBuf::from(index_file));
    }
    Some(segments.iter().collect())
}
