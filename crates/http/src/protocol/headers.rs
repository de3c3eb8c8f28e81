//! HTTP header collection with list-merge semantics.
//!
//! [`HeaderSet`] keeps header names lower-cased and merges repeated names into a
//! single comma separated value, the way HTTP defines multiple field lines with
//! the same name. It also knows how to parse one header line at a time from a
//! partially filled buffer, which is what the request decoder drives.

use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;
use crate::utils::{CRLF, find_crlf};

/// Separator used when merging values of a repeated header.
const VALUE_SEPARATOR: &str = ", ";

/// An ordered set of HTTP headers keyed by lower-case name.
///
/// Setting a name that is already present appends `", " + value` to the
/// existing value instead of overwriting it. Entries keep their insertion
/// order, which is also the order they are written on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a single header line from the front of `data`.
    ///
    /// # Returns
    ///
    /// - `Ok((0, false))` if `data` holds no complete line yet
    /// - `Ok((2, true))` if `data` starts with the empty line ending the header block
    /// - `Ok((n, false))` after a header line of `n` bytes (terminator included) was merged
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the line has no colon, whitespace between the name
    /// and the colon, a name outside the token charset, or is not valid UTF-8.
    /// Nothing is consumed and the set is left untouched on error.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(idx) = find_crlf(data) else {
            return Ok((0, false));
        };

        if idx == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = std::str::from_utf8(&data[..idx]).map_err(|e| ParseError::invalid_header(format!("line is not utf-8: {e}")))?;

        let Some((name, value)) = line.split_once(':') else {
            return Err(ParseError::invalid_header(format!("missing colon in {line:?}")));
        };

        ensure!(name.len() == name.trim_end().len(), ParseError::invalid_header(format!("whitespace before colon in {line:?}")));

        let name = name.trim_start();
        ensure!(is_valid_name(name), ParseError::invalid_header_name(name));

        let value = value.trim();
        trace!(name, value, "parsed header line");
        self.set(name, value);

        Ok((idx + CRLF.len(), false))
    }

    /// Adds a header, merging with an existing value of the same name.
    ///
    /// The name is stored lower-cased.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key = key.as_ref().to_ascii_lowercase();
        let value = value.as_ref();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => {
                existing.push_str(VALUE_SEPARATOR);
                existing.push_str(value);
            }
            None => self.entries.push((key, value.to_owned())),
        }
    }

    /// Sets a header, discarding any previous value of the same name.
    pub fn replace<K, V>(&mut self, key: K, value: V)
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let key = key.as_ref().to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Removes a header, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let position = self.entries.iter().position(|(name, _)| name.eq_ignore_ascii_case(key))?;
        Some(self.entries.remove(position).1)
    }

    /// Looks up a header value, ignoring the case of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(name, _)| name.eq_ignore_ascii_case(key)).map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = HeaderSet::new();
        for (key, value) in iter {
            headers.set(key, value);
        }
        headers
    }
}

/// Returns true if `b` may appear in a header field name.
#[inline]
fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_token_char)
}

/// Re-cases a header name to its canonical wire form, `content-type` to `Content-Type`.
///
/// The first letter and every letter following a `-` are upper-cased, the rest
/// lower-cased. Names with characters outside the token charset are returned as is.
pub fn canonical_name(name: &str) -> String {
    if !is_valid_name(name) {
        return name.to_owned();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let mapped = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            mapped
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_single_header() {
        let mut headers = HeaderSet::new();
        let data = b"Host: localhost:42069\r\n\r\n";
        let (n, done) = headers.parse(data).unwrap();

        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(n, 23);
        assert!(!done);
    }

    #[test]
    fn valid_single_header_with_extra_whitespace() {
        let mut headers = HeaderSet::new();
        let data = b"  Host:    localhost:42069\r\n\r\n";
        let (n, done) = headers.parse(data).unwrap();

        assert_eq!(headers.get("host"), Some("localhost:42069"));
        assert_eq!(n, 28);
        assert!(!done);
    }

    #[test]
    fn two_headers_then_done() {
        let mut headers = HeaderSet::new();
        let data = b"Host: localhost:42069\r\nUser-Agent: curl/7.81.0\r\n\r\n";

        let (n1, done) = headers.parse(data).unwrap();
        assert_eq!(n1, 23);
        assert!(!done);

        let (n2, done) = headers.parse(&data[n1..]).unwrap();
        assert_eq!(n2, 25);
        assert!(!done);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("user-agent"), Some("curl/7.81.0"));

        let (n3, done) = headers.parse(&data[n1 + n2..]).unwrap();
        assert_eq!(n3, 2);
        assert!(done);
    }

    #[test]
    fn incomplete_line_needs_more_data() {
        let mut headers = HeaderSet::new();
        assert_eq!(headers.parse(b"Host: local").unwrap(), (0, false));
        assert_eq!(headers.parse(b"Host: localhost\r").unwrap(), (0, false));
        assert!(headers.is_empty());
    }

    #[test]
    fn whitespace_before_colon_is_rejected() {
        let mut headers = HeaderSet::new();
        let result = headers.parse(b"   Host : localhost:42069   \r\n\r\n");

        assert!(matches!(result, Err(ParseError::InvalidHeader { .. })));
        assert!(headers.is_empty());
    }

    #[test]
    fn missing_colon_is_rejected() {
        let mut headers = HeaderSet::new();
        let result = headers.parse(b"Host localhost\r\n\r\n");

        assert!(matches!(result, Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn invalid_character_in_name() {
        let mut headers = HeaderSet::new();
        let result = headers.parse(b"H@st: x\r\n\r\n");

        match result {
            Err(ParseError::InvalidHeaderName { name }) => assert_eq!(name, "H@st"),
            other => panic!("expect invalid header name, got {other:?}"),
        }
        assert!(headers.is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut headers = HeaderSet::new();
        let result = headers.parse(b": value\r\n\r\n");

        assert!(matches!(result, Err(ParseError::InvalidHeaderName { .. })));
    }

    #[test]
    fn repeated_header_values_are_merged() {
        let mut headers = HeaderSet::new();
        let data = b"Host: localhost:42069\r\nSet-Person: testity1\r\nSet-Person: testity2\r\n\r\n";

        let mut offset = 0;
        loop {
            let (n, done) = headers.parse(&data[offset..]).unwrap();
            offset += n;
            if done {
                break;
            }
        }

        assert_eq!(offset, data.len());
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("set-person"), Some("testity1, testity2"));
    }

    #[test]
    fn empty_value() {
        let mut headers = HeaderSet::new();
        let (_, done) = headers.parse(b"Set-Person:\r\n\r\n").unwrap();

        assert!(!done);
        assert_eq!(headers.get("set-person"), Some(""));
    }

    #[test]
    fn set_merges_in_call_order_and_get_ignores_case() {
        let mut headers = HeaderSet::new();
        headers.set("Accept", "v1");
        headers.set("accept", "v2");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("ACCEPT"), Some("v1, v2"));
        assert_eq!(headers.get("accept"), Some("v1, v2"));
        assert_eq!(headers.iter().next(), Some(("accept", "v1, v2")));
    }

    #[test]
    fn replace_and_remove() {
        let mut headers: HeaderSet = [("Content-Type", "text/plain"), ("Content-Length", "3")].into_iter().collect();

        headers.replace("content-type", "text/html");
        assert_eq!(headers.get("Content-Type"), Some("text/html"));

        assert_eq!(headers.remove("CONTENT-LENGTH").as_deref(), Some("3"));
        assert!(!headers.contains("content-length"));
        assert_eq!(headers.remove("content-length"), None);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn split_reads_produce_identical_sets() {
        let data: &[u8] = b"Host: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\nAccept: text/html\r\nX-Empty:\r\n\r\n";

        let mut expected = HeaderSet::new();
        let mut offset = 0;
        loop {
            let (n, done) = expected.parse(&data[offset..]).unwrap();
            offset += n;
            if done {
                break;
            }
        }

        for chunk_size in [1, 8, data.len()] {
            let mut headers = HeaderSet::new();
            let mut buffer = Vec::new();
            let mut finished = false;

            for chunk in data.chunks(chunk_size) {
                buffer.extend_from_slice(chunk);
                loop {
                    let (n, done) = headers.parse(&buffer).unwrap();
                    buffer.drain(..n);
                    if done {
                        finished = true;
                    }
                    if n == 0 || done {
                        break;
                    }
                }
            }

            assert!(finished, "chunk size {chunk_size} never finished");
            assert!(buffer.is_empty());
            assert_eq!(headers, expected, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_name("content-type"), "Content-Type");
        assert_eq!(canonical_name("x-content-sha256"), "X-Content-Sha256");
        assert_eq!(canonical_name("HOST"), "Host");
        assert_eq!(canonical_name("etag"), "Etag");
        assert_eq!(canonical_name("bad name"), "bad name");
    }
}
