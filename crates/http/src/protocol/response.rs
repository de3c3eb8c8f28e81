//! HTTP response side types.
//!
//! [`WriterState`] tracks where a [`ResponseWriter`](crate::connection::ResponseWriter)
//! is in the legal write sequence. The `*_headers` functions build the header
//! sets most responses start from.

use crate::protocol::HeaderSet;

/// Position of a response writer in the write sequence:
/// status line, headers, body (plain or chunked), trailers, done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WriterState {
    #[default]
    StatusLine,
    Headers,
    Body,
    Trailers,
    Done,
}

/// Headers for a plain text response with a known body length.
pub fn default_headers(content_length: usize) -> HeaderSet {
    let mut headers = HeaderSet::new();
    headers.set("content-type", mime::TEXT_PLAIN.as_ref());
    headers.set("connection", "close");
    headers.set("content-length", content_length.to_string());
    headers
}

/// Headers for a plain text response sent with chunked transfer encoding.
pub fn chunked_headers() -> HeaderSet {
    let mut headers = HeaderSet::new();
    headers.set("transfer-encoding", "chunked");
    headers.set("connection", "close");
    headers.set("content-type", mime::TEXT_PLAIN.as_ref());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_declare_length() {
        let headers = default_headers(42);

        assert_eq!(headers.get("Content-Length"), Some("42"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("connection"), Some("close"));
        assert!(!headers.contains("transfer-encoding"));
    }

    #[test]
    fn chunked_headers_have_no_length() {
        let headers = chunked_headers();

        assert_eq!(headers.get("transfer-encoding"), Some("chunked"));
        assert!(!headers.contains("content-length"));
    }
}
