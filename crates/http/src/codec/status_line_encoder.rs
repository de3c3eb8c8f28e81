//! Status line encoding.
//!
//! Maps a status code to its wire form `HTTP/1.1 <code> <reason>\r\n`. Reason
//! phrases come from the standard status registry; a code without a registered
//! reason gets an empty one.

use bytes::BytesMut;
use http::StatusCode;
use tokio_util::codec::Encoder;

use crate::protocol::SendError;

/// Returns the full status line for `status`, terminator included.
pub fn status_line(status: StatusCode) -> String {
    format!("HTTP/1.1 {} {}\r\n", status.as_str(), status.canonical_reason().unwrap_or_default())
}

/// Encoder writing the status line of a response.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusLineEncoder;

impl Encoder<StatusCode> for StatusLineEncoder {
    type Error = SendError;

    fn encode(&mut self, item: StatusCode, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(status_line(item).as_bytes());
        Ok(())
    }
}
