use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::RequestDecoder;
use crate::config::ServerConfig;
use crate::protocol::{ParseError, Request};

/// Reads one request from a byte stream.
///
/// Bytes are read into a buffer that starts at the configured initial size and
/// doubles whenever it is full; consumed bytes are dropped from its front so the
/// unparsed tail is kept for the next read. The decoder enforces the configured
/// maximum request size, so the buffer can't grow without bound.
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
    buffer: BytesMut,
    decoder: RequestDecoder,
}

impl<R> RequestReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, &ServerConfig::default())
    }

    pub fn with_config(reader: R, config: &ServerConfig) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(config.get_initial_buffer_size()),
            decoder: RequestDecoder::with_max_request_size(config.get_max_request_size()),
        }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> RequestReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Reads until a full request is parsed.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the request is malformed or too large, if the stream
    /// ends before the request is complete, or if reading fails.
    pub async fn read_request(&mut self) -> Result<Request, ParseError> {
        loop {
            if self.buffer.len() == self.buffer.capacity() {
                let additional = self.buffer.capacity().max(1);
                self.buffer.reserve(additional);
                trace!(capacity = self.buffer.capacity(), "grow read buffer");
            }

            let n = self.reader.read_buf(&mut self.buffer).await.map_err(ParseError::io)?;
            trace!(read = n, buffered = self.buffer.len(), "read request bytes");

            let parsed = if n == 0 {
                self.decoder.decode_eof(&mut self.buffer)?
            } else {
                self.decoder.decode(&mut self.buffer)?
            };

            if let Some(request) = parsed {
                return Ok(request);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ParserState;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Hands out at most `chunk_size` bytes per read.
    struct ChunkedReader {
        data: Vec<u8>,
        pos: usize,
        chunk_size: usize,
    }

    impl ChunkedReader {
        fn new(data: &[u8], chunk_size: usize) -> Self {
            Self { data: data.to_vec(), pos: 0, chunk_size }
        }
    }

    impl AsyncRead for ChunkedReader {
        fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            let remaining = &self.data[self.pos..];
            let amt = remaining.len().min(buf.remaining()).min(self.chunk_size);
            buf.put_slice(&remaining[..amt]);
            self.pos += amt;
            Poll::Ready(Ok(()))
        }
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
        }
    }

    const REQUEST: &[u8] = b"POST /coffee HTTP/1.1\r\nHost: localhost:42069\r\nContent-Type: application/json\r\nContent-Length: 22\r\n\r\n{\"flavor\":\"dark mode\"}";

    #[tokio::test]
    async fn reads_across_chunk_sizes() {
        for chunk_size in [1, 3, 8, REQUEST.len()] {
            let mut reader = RequestReader::new(ChunkedReader::new(REQUEST, chunk_size));
            let request = reader.read_request().await.unwrap();

            assert_eq!(request.method(), "POST", "chunk size {chunk_size}");
            assert_eq!(request.target(), "/coffee");
            assert_eq!(request.headers().get("content-type"), Some("application/json"));
            assert_eq!(&request.body()[..], b"{\"flavor\":\"dark mode\"}");
        }
    }

    #[tokio::test]
    async fn buffer_grows_from_one_byte() {
        let config = ServerConfig::new().initial_buffer_size(1);
        let mut reader = RequestReader::with_config(ChunkedReader::new(REQUEST, 64), &config);
        let request = reader.read_request().await.unwrap();

        assert_eq!(request.headers().get("host"), Some("localhost:42069"));
        assert!(reader.buffer.capacity() > 1);
    }

    #[tokio::test]
    async fn eof_before_complete_request() {
        let mut reader = RequestReader::new(&b"GET / HTTP/1.1\r\nHost: localhost\r\n"[..]);
        let result = reader.read_request().await;

        assert!(matches!(result, Err(ParseError::Incomplete { .. })));
    }

    #[tokio::test]
    async fn eof_on_empty_stream() {
        let mut reader = RequestReader::new(&b""[..]);
        let result = reader.read_request().await;

        assert!(matches!(result, Err(ParseError::Incomplete { state: ParserState::Initialized })));
    }

    #[tokio::test]
    async fn request_over_limit() {
        let config = ServerConfig::new().initial_buffer_size(4).max_request_size(16);
        let mut reader = RequestReader::with_config(ChunkedReader::new(REQUEST, 8), &config);
        let result = reader.read_request().await;

        assert!(matches!(result, Err(ParseError::TooLargeRequest { max_size: 16, .. })));
    }

    #[tokio::test]
    async fn endless_header_section_over_limit() {
        let raw = [&b"GET / HTTP/1.1\r\n"[..], &b"X: aaaaaaaaaa\r\n".repeat(2000)[..], &b"\r\n"[..]].concat();
        let config = ServerConfig::new().max_request_size(64);
        let mut reader = RequestReader::with_config(&raw[..], &config);
        let result = reader.read_request().await;

        assert!(matches!(result, Err(ParseError::TooLargeRequest { max_size: 64, .. })));
    }

    #[tokio::test]
    async fn io_error_is_returned() {
        let mut reader = RequestReader::new(FailingReader);
        let result = reader.read_request().await;

        assert!(matches!(result, Err(ParseError::Io { .. })));
    }
}
