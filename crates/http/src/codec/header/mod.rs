//! HTTP header block encoding
//!
//! - [`HeaderEncoder`]: encodes a [`HeaderSet`](crate::protocol::HeaderSet) as a
//!   header or trailer block
//!
//! Header decoding lives on [`HeaderSet::parse`](crate::protocol::HeaderSet::parse),
//! which the request decoder drives one line at a time.

mod header_encoder;

pub use header_encoder::HeaderEncoder;
