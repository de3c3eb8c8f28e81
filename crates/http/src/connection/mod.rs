//! HTTP connection handling module
//!
//! This module reads a request from a byte stream and writes the response back,
//! one request per connection.
//!
//! # Components
//!
//! - [`HttpConnection`]: drives one connection from request to response
//! - [`RequestReader`]: reads into a growing buffer until the decoder yields a request
//! - [`ResponseWriter`]: enforces the status line, headers, body, trailers write order
//!   and implements chunked framing

mod http_connection;
mod request_reader;
mod response_writer;

pub use crate::protocol::WriterState;
pub use http_connection::HttpConnection;
pub use request_reader::RequestReader;
pub use response_writer::ResponseWriter;
