use std::sync::Arc;

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::connection::{RequestReader, ResponseWriter};
use crate::handler::Handler;
use crate::protocol::response::default_headers;
use crate::protocol::{HttpError, SendError, WriterState};

/// An HTTP connection serving exactly one request
///
/// `HttpConnection` handles the lifecycle of a connection:
/// - Reading and decoding the request
/// - Answering malformed requests with `400 Bad Request` without calling the handler
/// - Handing the request and the response writer to the handler
/// - Shutting down the write side once the handler returns
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: RequestReader<R>,
    writer: ResponseWriter<W>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, &ServerConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: &ServerConfig) -> Self {
        Self { reader: RequestReader::with_config(reader, config), writer: ResponseWriter::new(writer) }
    }

    /// Reads the request, runs `handler` on it and closes the write side.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if the request can't be parsed, the handler fails, or the
    /// error response can't be written. Error responses are sent before returning.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler<W>,
    {
        let result = self.do_process(&handler).await;

        if let Err(e) = self.writer.get_mut().shutdown().await {
            debug!(cause = %e, "shutdown connection failed");
        }

        result
    }

    async fn do_process<H>(&mut self, handler: &Arc<H>) -> Result<(), HttpError>
    where
        H: Handler<W>,
    {
        let request = match self.reader.read_request().await {
            Ok(request) => request,
            Err(e) => {
                error!(cause = %e, "can't parse request");
                let body = format!("Error parsing request: {e}");
                if let Err(send_error) = self.send_error_response(StatusCode::BAD_REQUEST, &body).await {
                    warn!(cause = %send_error, "can't send bad request response");
                }
                return Err(e.into());
            }
        };

        info!(method = request.method(), target = request.target(), "receive request");

        if let Err(e) = handler.call(&mut self.writer, request).await {
            error!(cause = %e, "handle request error");
            // only answer if the handler didn't start a response of its own
            if self.writer.state() == WriterState::StatusLine {
                self.send_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").await?;
            }
            return Err(HttpError::handler(e));
        }

        Ok(())
    }

    async fn send_error_response(&mut self, status: StatusCode, body: &str) -> Result<(), SendError> {
        self.writer.write_status_line(status).await?;
        self.writer.write_headers(&default_headers(body.len())).await?;
        self.writer.write_body(body.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::response::chunked_headers;
    use crate::protocol::{HandlerError, HeaderSet, ParseError, Request};
    use indoc::indoc;

    struct Hello;

    impl<W: AsyncWrite + Unpin + Send> Handler<W> for Hello {
        async fn call(&self, writer: &mut ResponseWriter<W>, request: Request) -> Result<(), HandlerError> {
            let body = format!("{} {}", request.method(), request.target());
            writer.write_status_line(StatusCode::OK).await?;
            writer.write_headers(&default_headers(body.len())).await?;
            writer.write_body(body.as_bytes()).await?;
            Ok(())
        }
    }

    struct Streaming;

    impl<W: AsyncWrite + Unpin + Send> Handler<W> for Streaming {
        async fn call(&self, writer: &mut ResponseWriter<W>, request: Request) -> Result<(), HandlerError> {
            let mut headers = chunked_headers();
            headers.set("trailer", "X-Content-Length");
            writer.write_status_line(StatusCode::OK).await?;
            writer.write_headers(&headers).await?;

            let mut length = 0;
            for chunk in request.body().chunks(4) {
                length += chunk.len();
                writer.write_chunked_body(chunk).await?;
            }
            writer.write_chunked_body_done().await?;

            let mut trailers = HeaderSet::new();
            trailers.set("x-content-length", length.to_string());
            writer.write_trailers(&trailers).await?;
            Ok(())
        }
    }

    struct Failing;

    impl<W: AsyncWrite + Unpin + Send> Handler<W> for Failing {
        async fn call(&self, _writer: &mut ResponseWriter<W>, _request: Request) -> Result<(), HandlerError> {
            Err("backend unavailable".into())
        }
    }

    async fn run<H>(input: &[u8], handler: H) -> (Result<(), HttpError>, String)
    where
        H: for<'a> Handler<&'a mut Vec<u8>>,
    {
        let mut output = Vec::new();
        let connection = HttpConnection::new(input, &mut output);
        let result = connection.process(Arc::new(handler)).await;
        (result, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn handler_writes_response() {
        let input = indoc! {r##"
        GET /yourproblem HTTP/1.1
        Host: localhost:42069

        "##}
        .replace('\n', "\r\n");

        let mut output = Vec::new();
        let connection = HttpConnection::new(input.as_bytes(), &mut output);
        connection.process(Arc::new(Hello)).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.contains("Content-Length: 16\r\n"));
        assert!(output.ends_with("\r\n\r\nGET /yourproblem"));
    }

    #[tokio::test]
    async fn chunked_response_with_trailers() {
        let input = b"POST /echo HTTP/1.1\r\nContent-Length: 10\r\n\r\n0123456789";

        let mut output = Vec::new();
        let connection = HttpConnection::new(&input[..], &mut output);
        connection.process(Arc::new(Streaming)).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Transfer-Encoding: chunked\r\n"));
        assert!(output.ends_with("\r\n\r\n4\r\n0123\r\n4\r\n4567\r\n2\r\n89\r\n0\r\nX-Content-Length: 10\r\n\r\n"));
    }

    #[tokio::test]
    async fn malformed_request_gets_bad_request() {
        let (result, output) = run(b"GET / HTTP/2.0\r\n\r\n", Hello).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::InvalidVersion { .. } })));
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(output.contains("Connection: close\r\n"));
        assert!(output.ends_with("\r\n\r\nError parsing request: unsupported http version: 2.0"));
    }

    #[tokio::test]
    async fn truncated_request_gets_bad_request() {
        let (result, output) = run(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nab", Hello).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::Incomplete { .. } })));
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn failing_handler_gets_internal_server_error() {
        let (result, output) = run(b"GET / HTTP/1.1\r\n\r\n", Failing).await;

        assert!(matches!(result, Err(HttpError::HandlerError { .. })));
        assert!(output.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(output.ends_with("\r\n\r\nInternal Server Error"));
    }
}
