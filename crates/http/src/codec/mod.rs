//! HTTP codec module for decoding requests and encoding responses
//!
//! This module holds the wire level pieces of the protocol. Decoding uses a state
//! machine that tolerates input split at any byte boundary; encoding turns the
//! individual parts of a response into bytes.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: decodes an incoming HTTP request
//!
//! - Response handling:
//!   - [`StatusLineEncoder`]: encodes the status line
//!   - [`HeaderEncoder`]: encodes header and trailer blocks
//!   - [`ChunkedEncoder`]: encodes chunked body frames
//!
//! The encoders know nothing about ordering. The
//! [`ResponseWriter`](crate::connection::ResponseWriter) decides which of them
//! may run next.
//!
//! # Example
//!
//! ```
//! use tcp_http::codec::{HeaderEncoder, StatusLineEncoder};
//! use tcp_http::protocol::HeaderSet;
//! use tokio_util::codec::Encoder;
//! use bytes::BytesMut;
//! use http::StatusCode;
//!
//! let mut headers = HeaderSet::new();
//! headers.set("content-length", "0");
//!
//! let mut buffer = BytesMut::new();
//! StatusLineEncoder.encode(StatusCode::OK, &mut buffer).unwrap();
//! HeaderEncoder.encode(&headers, &mut buffer).unwrap();
//! assert_eq!(&buffer[..], b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n");
//! ```

mod body;
mod header;
mod request_decoder;
mod status_line_encoder;

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};

pub use body::ChunkedEncoder;
pub use header::HeaderEncoder;
pub use request_decoder::RequestDecoder;
pub use status_line_encoder::{StatusLineEncoder, status_line};

/// Writer adapter formatting straight into a `BytesMut`.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl Write for FastWrite<'_> {
    /// Writes a buffer into this writer, returning how many bytes were written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    /// Nothing is buffered, so there is nothing to flush.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
