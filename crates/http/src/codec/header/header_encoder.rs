//! HTTP header block encoder
//!
//! Serializes a [`HeaderSet`] as `Name: value\r\n` lines followed by the empty
//! line closing the block. The same format serves the header section after the
//! status line and the trailer section after the last chunk.
//!
//! Names are stored lower-cased and re-cased to their canonical form on the
//! wire, `content-type` becomes `Content-Type`.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::SendError;
use crate::protocol::headers::{HeaderSet, canonical_name};
use crate::utils::CRLF;

/// Initial buffer size reserved for header serialization
const INIT_HEADER_SIZE: usize = 512;

/// Encoder for header and trailer blocks implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl<'a> Encoder<&'a HeaderSet> for HeaderEncoder {
    type Error = SendError;

    /// Encodes every header in insertion order, then the terminating empty line.
    fn encode(&mut self, item: &'a HeaderSet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);

        for (name, value) in item.iter() {
            dst.put_slice(canonical_name(name).as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(CRLF);
        }
        dst.put_slice(CRLF);
        Ok(())
    }
}
