//! HTTP Range request parsing module
//!
//! Single `bytes` ranges only (RFC 7233). Anything else is ignored and the
//! full body is served.

/// Inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub const fn length(self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a file of `total` bytes
    pub fn content_range(self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No usable Range header: serve everything
    Full,
    Partial(ByteRange),
    /// Syntactically fine but outside the file, answer 416
    Unsatisfiable,
}

pub fn parse_range(header: Option<&str>, file_size: u64) -> RangeOutcome {
    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };
    if spec.contains(',') {
        return RangeOutcome::Full;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        // "-n": the final n bytes
        return match last.parse::<u64>() {
            Ok(0) => RangeOutcome::Unsatisfiable,
            Ok(_) if file_size == 0 => RangeOutcome::Unsatisfiable,
            Ok(n) => RangeOutcome::Partial(ByteRange {
                start: file_size.saturating_sub(n),
                end: file_size - 1,
            }),
            Err(_) => RangeOutcome::Full,
        };
    }

    let Ok(start) = first.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    let end = if last.is_empty() {
        None
    } else if let Ok(e) = last.parse::<u64>() {
        Some(e)
    } else {
        return RangeOutcome::Full;
    };

    if end.is_some_and(|e| e < start) {
        return RangeOutcome::Full;
    }
    if start >= file_size {
        return RangeOutcome::Unsatisfiable;
    }

    let end = end.map_or(file_size - 1, |e| e.min(file_size - 1));
    RangeOutcome::Partial(ByteRange { start, end })
}
