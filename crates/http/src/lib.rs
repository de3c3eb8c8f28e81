//! HTTP/1.1 over a raw TCP stream
//!
//! This crate implements the protocol layer of a small HTTP/1.1 server by hand:
//! an incremental request parser that accepts input split at any byte boundary,
//! a response writer that enforces the status line, headers, body order and
//! supports chunked transfer encoding with trailers, and a server that runs one
//! task per connection and serves a single request on each.
//!
//! # Example
//!
//! ```no_run
//! use http::StatusCode;
//! use tcp_http::connection::ResponseWriter;
//! use tcp_http::handler::Handler;
//! use tcp_http::protocol::response::default_headers;
//! use tcp_http::protocol::{HandlerError, Request};
//! use tcp_http::server::Server;
//! use tokio::net::tcp::OwnedWriteHalf;
//!
//! struct HelloWorld;
//!
//! impl Handler<OwnedWriteHalf> for HelloWorld {
//!     async fn call(&self, writer: &mut ResponseWriter<OwnedWriteHalf>, _request: Request) -> Result<(), HandlerError> {
//!         let body = "Hello World!\n";
//!         writer.write_status_line(StatusCode::OK).await?;
//!         writer.write_headers(&default_headers(body.len())).await?;
//!         writer.write_body(body.as_bytes()).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::start("127.0.0.1:42069", HelloWorld).await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: headers, request and response types, errors
//! - [`codec`]: the request decoder and the response encoders
//! - [`connection`]: the read loop, the response writer and the per connection driver
//! - [`handler`]: the callback invoked for every parsed request
//! - [`server`]: listener, accept loop and shutdown
//! - [`config`]: buffer, request size and connection limits
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: the request could not be read or parsed
//! - [`protocol::SendError`]: a response write was out of order or failed
//! - [`protocol::HttpError`]: what a connection ended with
//! - [`server::ServerError`]: the listener could not be set up
//!
//! # Limitations
//!
//! - One request per connection, every response carries `Connection: close`
//! - Request bodies are only read by `Content-Length`, chunked requests are not decoded
//! - No timeouts on reads or writes
//! - No TLS

pub mod codec;
pub mod config;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
