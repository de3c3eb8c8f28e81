use bytes::{Buf, Bytes};

/// Represents an item in a chunked payload stream.
///
/// The chunked encoder turns every `Chunk` into one length-prefixed frame and
/// the `Eof` marker into the terminating zero-length frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

impl From<Bytes> for PayloadItem {
    fn from(bytes: Bytes) -> Self {
        Self::Chunk(bytes)
    }
}
