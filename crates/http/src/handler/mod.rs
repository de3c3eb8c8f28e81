//! Request handler contract.
//!
//! A [`Handler`] receives the parsed [`Request`] together with the connection's
//! [`ResponseWriter`] and is responsible for writing exactly one complete response
//! through it. The connection does not check that the handler finished the write
//! sequence.
//!
//! # Example
//!
//! ```
//! use http::StatusCode;
//! use tcp_http::connection::ResponseWriter;
//! use tcp_http::handler::Handler;
//! use tcp_http::protocol::response::default_headers;
//! use tcp_http::protocol::{HandlerError, Request};
//! use tokio::io::AsyncWrite;
//!
//! struct Echo;
//!
//! impl<W: AsyncWrite + Unpin + Send> Handler<W> for Echo {
//!     async fn call(&self, writer: &mut ResponseWriter<W>, request: Request) -> Result<(), HandlerError> {
//!         writer.write_status_line(StatusCode::OK).await?;
//!         writer.write_headers(&default_headers(request.body().len())).await?;
//!         writer.write_body(request.body()).await?;
//!         Ok(())
//!     }
//! }
//! ```

use crate::connection::ResponseWriter;
use crate::protocol::{HandlerError, Request};

/// Application callback invoked once per successfully parsed request.
///
/// `W` is the write half of the connection. The returned future must be `Send`
/// since every connection runs on its own task.
pub trait Handler<W>: Send + Sync {
    fn call(&self, writer: &mut ResponseWriter<W>, request: Request) -> impl Future<Output = Result<(), HandlerError>> + Send;
}
