//! HTTP request decoder module
//!
//! This module turns a growing byte buffer into a complete [`Request`]. Bytes may
//! arrive split at any boundary: every call parses as far as the buffered data
//! allows and leaves unconsumed bytes in place for the next call.
//!
//! # State Machine
//!
//! The decoder walks the request through the [`ParserState`] tag:
//!
//! 1. `Initialized`: parse the request line `METHOD SP TARGET SP HTTP/1.1 CRLF`
//! 2. `ParsingHeaders`: parse one header line per step until the empty line
//! 3. `ParsingBody`: wait for exactly `Content-Length` body bytes, if any
//! 4. `Done`: the request is handed out, nothing more may be parsed
//!
//! # Example
//!
//! ```
//! use tcp_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /index.html HTTP/1.1\r\nHost: local");
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"host\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.target(), "/index.html");
//! assert_eq!(request.headers().get("host"), Some("localhost"));
//! ```

use std::mem;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::config::DEFAULT_MAX_REQUEST_SIZE;
use crate::ensure;
use crate::protocol::{HeaderSet, ParseError, ParserState, Request, RequestLine};
use crate::utils::{CRLF, find_crlf};

/// The only protocol version accepted in the request line
const HTTP_VERSION: &str = "1.1";

const HTTP_VERSION_PREFIX: &str = "HTTP/";

/// A decoder for a single HTTP request.
///
/// The decoder owns the request under construction. Once a request reached
/// [`ParserState::Done`] it is returned from [`Decoder::decode`] and the decoder
/// refuses any further input. The same holds after any error: the request may be
/// half parsed at that point, so the decoder is finished too.
///
/// `max_request_size` bounds every byte of the request, the ones already parsed
/// into the request line and headers as well as the ones still buffered.
#[derive(Debug)]
pub struct RequestDecoder {
    request: Request,
    max_request_size: usize,
    /// bytes parsed so far
    consumed: usize,
    finished: bool,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a decoder that rejects requests larger than `max_request_size` bytes.
    pub fn with_max_request_size(max_request_size: usize) -> Self {
        Self { request: Request::default(), max_request_size, consumed: 0, finished: false }
    }

    pub fn state(&self) -> ParserState {
        self.request.state
    }

    /// The request parsed so far.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Runs the state machine over `data` until it is done or needs more bytes.
    ///
    /// Returns the number of bytes consumed from the front of `data`, which may be
    /// zero when no step could complete.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the request is malformed, too large or already fully
    /// parsed. After an error every further call fails with `AlreadyDone`.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        ensure!(!self.finished && self.request.state != ParserState::Done, ParseError::AlreadyDone);

        match self.parse_available(data) {
            Ok(total) => {
                trace!(consumed = total, state = ?self.request.state, "parsed request bytes");
                Ok(total)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    fn parse_available(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut total = 0;
        while self.request.state != ParserState::Done {
            let n = self.parse_single(&data[total..])?;
            if n == 0 {
                break;
            }
            total += n;
            self.consumed += n;
            ensure!(self.consumed <= self.max_request_size, ParseError::too_large_request(self.consumed, self.max_request_size));
        }
        Ok(total)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.request.state {
            ParserState::Initialized => {
                let Some((request_line, n)) = parse_request_line(data)? else {
                    return Ok(0);
                };
                self.request.request_line = request_line;
                self.request.state = ParserState::ParsingHeaders;
                Ok(n)
            }

            ParserState::ParsingHeaders => {
                let (n, done) = self.request.headers.parse(data)?;
                if done {
                    self.request.state = ParserState::ParsingBody;
                }
                Ok(n)
            }

            ParserState::ParsingBody => {
                let Some(length) = parse_content_length(&self.request.headers) else {
                    self.request.state = ParserState::Done;
                    return Ok(0);
                };

                let request_size = self.consumed.saturating_add(length);
                ensure!(request_size <= self.max_request_size, ParseError::too_large_request(request_size, self.max_request_size));

                ensure!(data.len() <= length, ParseError::body_length_mismatch(length, data.len()));
                if data.len() < length {
                    return Ok(0);
                }

                self.request.body = Bytes::copy_from_slice(&data[..length]);
                self.request.state = ParserState::Done;
                Ok(length)
            }

            ParserState::Done => Err(ParseError::AlreadyDone),
        }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_max_request_size(DEFAULT_MAX_REQUEST_SIZE)
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode an HTTP request from the provided buffer
    ///
    /// Consumed bytes are removed from `src`; a malformed request leaves `src`
    /// untouched. Any error finishes the decoder.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let consumed = self.parse(src)?;
        src.advance(consumed);

        if self.request.state == ParserState::Done {
            self.finished = true;
            return Ok(Some(mem::take(&mut self.request)));
        }

        let request_size = self.consumed + src.len();
        if request_size > self.max_request_size {
            self.finished = true;
            return Err(ParseError::too_large_request(request_size, self.max_request_size));
        }
        Ok(None)
    }

    /// The stream ended: whatever was buffered must complete the request.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(request) => Ok(Some(request)),
            None => Err(ParseError::incomplete(self.request.state)),
        }
    }
}

/// Parses the request line, returning it with the consumed length including CRLF.
///
/// Returns `Ok(None)` if no complete line is buffered yet.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(idx) = find_crlf(data) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&data[..idx]).map_err(|e| ParseError::invalid_request_line(format!("line is not utf-8: {e}")))?;

    let fields = line.split_whitespace().collect::<Vec<_>>();
    let [method, target, version] = fields.as_slice() else {
        return Err(ParseError::invalid_request_line(format!("expect 3 fields but got {} in {line:?}", fields.len())));
    };

    ensure!(method.bytes().all(|b| b.is_ascii_uppercase()), ParseError::invalid_method(method));

    let Some(version) = version.strip_prefix(HTTP_VERSION_PREFIX) else {
        return Err(ParseError::invalid_request_line(format!("malformed http version {version:?}")));
    };
    ensure!(version == HTTP_VERSION, ParseError::invalid_version(version));

    trace!(method, target, version, "parsed request line");
    let request_line = RequestLine::new((*method).to_owned(), (*target).to_owned(), version.to_owned());
    Ok(Some((request_line, idx + CRLF.len())))
}

/// Reads the declared body length.
///
/// Returns `None` when the request has no body: no `Content-Length` header, a value
/// below one, or a value that is not an integer at all.
fn parse_content_length(headers: &HeaderSet) -> Option<usize> {
    let value = headers.get("content-length")?;

    match value.trim().parse::<i64>() {
        Ok(length) if length >= 1 => Some(usize::try_from(length).unwrap_or(usize::MAX)),
        Ok(_) => None,
        Err(e) => {
            debug!(value, cause = %e, "ignore content-length that is not an integer");
            None
        }
    }
}
