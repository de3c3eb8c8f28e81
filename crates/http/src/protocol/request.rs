//! HTTP request representation.
//!
//! A [`Request`] is filled in step by step by the
//! [`RequestDecoder`](crate::codec::RequestDecoder) as bytes arrive: first the
//! [`RequestLine`], then the [`HeaderSet`], then the body. The [`ParserState`]
//! tag records how far parsing got.

use bytes::Bytes;

use crate::protocol::HeaderSet;

/// Progress of request parsing. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ParserState {
    #[default]
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// The first line of a request: `METHOD SP TARGET SP HTTP/VERSION`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: String,
    version: String,
}

impl RequestLine {
    pub(crate) fn new(method: String, target: String, version: String) -> Self {
        Self { method, target, version }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The version without its `HTTP/` prefix, always `1.1` once parsed.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// A parsed HTTP request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub(crate) request_line: RequestLine,
    pub(crate) headers: HeaderSet,
    pub(crate) body: Bytes,
    pub(crate) state: ParserState,
}

impl Request {
    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> &str {
        self.request_line.method()
    }

    pub fn target(&self) -> &str {
        self.request_line.target()
    }

    pub fn version(&self) -> &str {
        self.request_line.version()
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Consumes the request and returns its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}
