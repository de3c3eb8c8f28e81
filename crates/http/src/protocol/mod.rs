//! Core HTTP protocol types.
//!
//! # Components
//!
//! - **Headers** ([`headers`]): [`HeaderSet`], the case-insensitive header
//!   collection with list-merge semantics, and its line parser
//! - **Request**: [`Request`], [`RequestLine`] and the
//!   [`ParserState`] tag driven by the request decoder
//! - **Response** ([`response`]): [`WriterState`] and default header sets
//! - **Message**: [`PayloadItem`] fed to the chunked encoder
//! - **Error Handling**:
//!   - [`HttpError`]: Top-level error type of a connection
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response writing errors

mod message;
pub use message::PayloadItem;

pub mod headers;
pub use headers::HeaderSet;

mod request;
pub use request::ParserState;
pub use request::Request;
pub use request::RequestLine;

pub mod response;
pub use response::WriterState;

mod error;
pub use error::HandlerError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
