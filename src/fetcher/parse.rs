//! Parse HTTP response header lines into ResponseHead.

/// Response metadata the fetcher and its callers care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    /// Reason phrase from the status line (absent on HTTP/2).
    pub status_message: Option<String>,
    /// `Content-Length`, if present and numeric.
    pub content_length: Option<u64>,
    /// `Location`, for redirects. May be relative.
    pub location: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_type: Option<String>,
}

/// Parse collected header lines into ResponseHead.
///
/// A status line starts a new block, so interim responses such as
/// `100 Continue` do not leak into the final result.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = ResponseHead {
                status_message: reason_phrase(line),
                ..ResponseHead::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    head.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("location") {
                head.location = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("etag") {
                head.etag = Some(value.trim_matches('"').to_string());
            }
            if name.eq_ignore_ascii_case("last-modified") {
                head.last_modified = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-type") {
                head.content_type = Some(value.to_string());
            }
        }
    }

    head
}

/// `HTTP/1.1 404 Not Found` → `Not Found`.
fn reason_phrase(status_line: &str) -> Option<String> {
    let mut parts = status_line.splitn(3, ' ');
    parts.next()?;
    parts.next()?;
    let reason = parts.next()?.trim();
    if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    }
}
