//! HTTP body encoding
//!
//! - [`ChunkedEncoder`]: implements chunked transfer encoding framing
//!
//! Bodies with a known length are written as raw bytes and need no encoder.

mod chunked_encoder;

pub use chunked_encoder::ChunkedEncoder;
