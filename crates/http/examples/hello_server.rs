use std::error::Error;

use http::StatusCode;
use sha2::{Digest, Sha256};
use tcp_http::connection::ResponseWriter;
use tcp_http::handler::Handler;
use tcp_http::protocol::response::{chunked_headers, default_headers};
use tcp_http::protocol::{HandlerError, HeaderSet, Request};
use tcp_http::server::Server;
use tokio::net::tcp::OwnedWriteHalf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const PORT: u16 = 42069;

const BAD_REQUEST_PAGE: &str = r"<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>
";

const INTERNAL_ERROR_PAGE: &str = r"<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>
";

const OK_PAGE: &str = r"<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>
";

struct Pages;

impl Handler<OwnedWriteHalf> for Pages {
    async fn call(&self, writer: &mut ResponseWriter<OwnedWriteHalf>, request: Request) -> Result<(), HandlerError> {
        let target = request.target();

        if let Some(count) = target.strip_prefix("/chunked/") {
            return write_chunks(writer, count.parse()?).await;
        }

        match target {
            "/yourproblem" => write_page(writer, StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE).await,
            "/myproblem" => write_page(writer, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_PAGE).await,
            _ => write_page(writer, StatusCode::OK, OK_PAGE).await,
        }
    }
}

async fn write_page(writer: &mut ResponseWriter<OwnedWriteHalf>, status: StatusCode, page: &str) -> Result<(), HandlerError> {
    let mut headers = default_headers(page.len());
    headers.replace("content-type", mime::TEXT_HTML.as_ref());

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    Ok(())
}

async fn write_chunks(writer: &mut ResponseWriter<OwnedWriteHalf>, count: usize) -> Result<(), HandlerError> {
    let mut headers = chunked_headers();
    headers.set("trailer", "X-Content-SHA256, X-Content-Length");

    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut length = 0;
    for i in 0..count {
        let line = format!("chunk {i}\n");
        hasher.update(line.as_bytes());
        length += line.len();
        writer.write_chunked_body(line.as_bytes()).await?;
    }
    writer.write_chunked_body_done().await?;

    // the body is fully sent, summarize it in the trailers
    let mut trailers = HeaderSet::new();
    trailers.set("x-content-sha256", format!("{:x}", hasher.finalize()));
    trailers.set("x-content-length", length.to_string());
    writer.write_trailers(&trailers).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let server = Server::start(("127.0.0.1", PORT), Pages).await?;
    info!(port = PORT, "server started, press ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    server.close().await;
    info!("server gracefully stopped");
    Ok(())
}
