//! Encoder for chunked transfer encoding.
//!
//! Each [`PayloadItem::Chunk`] becomes one frame `<HEX-LENGTH>\r\n<payload>\r\n`,
//! and [`PayloadItem::Eof`] becomes the zero-length chunk `0\r\n`. The empty line
//! closing the message is not written here: it follows the optional trailer
//! section and is the job of whoever finishes the response.

use crate::codec::FastWrite;
use crate::protocol::{PayloadItem, SendError};
use crate::utils::CRLF;
use bytes::{Buf, BufMut, BytesMut};
use std::io::Write;

use tokio_util::codec::Encoder;

/// The zero-length chunk marking the end of the body
const LAST_CHUNK: &[u8] = b"0\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    /// Returns true once the zero-length chunk was encoded.
    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                // an empty frame would read as the end of the body
                if !bytes.has_remaining() {
                    return Ok(());
                }

                let size = bytes.remaining();
                write!(FastWrite(dst), "{size:X}\r\n")?;
                dst.reserve(size + CRLF.len());
                dst.put(bytes);
                dst.extend_from_slice(CRLF);
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(LAST_CHUNK);
                Ok(())
            }
        }
    }
}
