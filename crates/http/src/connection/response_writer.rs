//! Response writer enforcing the HTTP/1.1 write sequence.
//!
//! A response is written in a fixed order:
//!
//! ```text
//! status line -> headers -> body                                  -> done
//!                        -> chunk* -> last chunk -> trailers      -> done
//!                                                -> finalize      -> done
//! ```
//!
//! Every operation checks the current [`WriterState`] first. A call out of order
//! fails with [`SendError::InvalidState`], writes nothing and leaves the state as
//! it was. Bytes are written through to the transport and flushed before an
//! operation returns.

use bytes::BytesMut;
use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{debug, trace};

use crate::codec::{ChunkedEncoder, HeaderEncoder, StatusLineEncoder};
use crate::ensure;
use crate::protocol::{HeaderSet, PayloadItem, SendError, WriterState};
use crate::utils::CRLF;

/// Initial capacity of the encoding buffer
const INIT_BUFFER_SIZE: usize = 1024;

#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    state: WriterState,
    chunked_encoder: ChunkedEncoder,
    chunked: bool,
}

impl<W> ResponseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(INIT_BUFFER_SIZE),
            state: WriterState::StatusLine,
            chunked_encoder: ChunkedEncoder::new(),
            chunked: false,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn expect_state(&self, operation: &'static str, expected: WriterState) -> Result<(), SendError> {
        ensure!(self.state == expected, SendError::invalid_state(operation, self.state));
        Ok(())
    }

    fn advance(&mut self, next: WriterState) {
        trace!(from = ?self.state, to = ?next, "response writer state changed");
        self.state = next;
    }
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.expect_state("write status line", WriterState::StatusLine)?;

        StatusLineEncoder.encode(status, &mut self.buffer)?;
        self.flush().await?;

        self.advance(WriterState::Headers);
        Ok(())
    }

    /// Writes every header as `Name: value\r\n`, then the empty line ending the block.
    pub async fn write_headers(&mut self, headers: &HeaderSet) -> Result<(), SendError> {
        self.expect_state("write headers", WriterState::Headers)?;

        HeaderEncoder.encode(headers, &mut self.buffer)?;
        self.flush().await?;

        self.advance(WriterState::Body);
        Ok(())
    }

    /// Writes the whole body as is and completes the response.
    ///
    /// Can't be mixed with chunked writes on the same response.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, SendError> {
        self.expect_state("write body", WriterState::Body)?;
        ensure!(!self.chunked, SendError::invalid_state("write body after chunked body", self.state));

        self.writer.write_all(body).await?;
        self.writer.flush().await?;

        self.advance(WriterState::Done);
        Ok(body.len())
    }

    /// Writes one chunk frame, returning the number of bytes put on the wire.
    ///
    /// The writer stays in the body state so further chunks may follow. An empty
    /// `data` writes nothing.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, SendError> {
        self.expect_state("write chunked body", WriterState::Body)?;

        self.chunked_encoder.encode(PayloadItem::Chunk(data), &mut self.buffer)?;
        self.chunked = true;
        self.flush().await
    }

    /// Writes the zero-length chunk ending the body. Trailers may follow.
    pub async fn write_chunked_body_done(&mut self) -> Result<usize, SendError> {
        self.expect_state("write chunked body done", WriterState::Body)?;

        self.chunked_encoder.encode(PayloadItem::<&[u8]>::Eof, &mut self.buffer)?;
        self.chunked = true;
        let written = self.flush().await?;

        self.advance(WriterState::Trailers);
        Ok(written)
    }

    /// Writes the trailer section and completes the response.
    pub async fn write_trailers(&mut self, trailers: &HeaderSet) -> Result<(), SendError> {
        self.expect_state("write trailers", WriterState::Trailers)?;

        HeaderEncoder.encode(trailers, &mut self.buffer)?;
        self.flush().await?;

        self.advance(WriterState::Done);
        Ok(())
    }

    /// Completes a chunked response that has no trailers.
    ///
    /// Only writes the final empty line while in the trailers state, in any other
    /// state it does nothing.
    pub async fn finalize_chunked_response(&mut self) -> Result<(), SendError> {
        if self.state != WriterState::Trailers {
            debug!(state = ?self.state, "skip finalize, no trailer section pending");
            return Ok(());
        }

        self.buffer.extend_from_slice(CRLF);
        self.flush().await?;

        self.advance(WriterState::Done);
        Ok(())
    }

    /// Writes the encoded bytes out, returning how many there were.
    async fn flush(&mut self) -> Result<usize, SendError> {
        let bytes = self.buffer.split();
        if bytes.is_empty() {
            return Ok(0);
        }

        self.writer.write_all(&bytes).await?;
        self.writer.flush().await?;
        Ok(bytes.len())
    }
}
